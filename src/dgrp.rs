use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Column used to label each row in the progress output.
pub const NAME_COLUMN: &str = "dgrpName";

/// A device group record: column heading -> cell value for one CSV row.
///
/// Headings and cells are kept as the raw bytes from the file, so a
/// Latin-1 export goes out unchanged. The map is ordered so the fields
/// come out key-sorted when they are encoded into the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dgrp(BTreeMap<Vec<u8>, Vec<u8>>);

impl Dgrp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw value of a column.
    pub fn get(&self, column: &str) -> Option<&[u8]> {
        self.0.get(column.as_bytes()).map(Vec::as_slice)
    }

    /// Value of a column for display; invalid UTF-8 is replaced.
    pub fn field(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column).map(String::from_utf8_lossy)
    }

    /// The `dgrpName` of a record, or an empty string when the file has
    /// no such column.
    pub fn name(&self) -> Cow<'_, str> {
        self.field(NAME_COLUMN).unwrap_or_default()
    }

    /// `(heading, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.0.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

/// Zip a data row with the heading row.
///
/// Both sides must have the same number of fields. A repeated heading
/// keeps the value of its last column.
pub fn map_row<H, R>(headings: &[H], row: &[R]) -> Result<Dgrp>
where
    H: AsRef<[u8]>,
    R: AsRef<[u8]>,
{
    if headings.len() != row.len() {
        return Err(Error::FieldCount {
            expected: headings.len(),
            found: row.len(),
        });
    }

    Ok(Dgrp(
        headings
            .iter()
            .zip(row)
            .map(|(h, v)| (h.as_ref().to_vec(), v.as_ref().to_vec()))
            .collect(),
    ))
}
