use std::io::{Read, Write};

use csv::ReaderBuilder;

use crate::api::Submit;
use crate::dgrp::map_row;
use crate::error::Result;

/// Row counts for one pass over the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub submitted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Read the CSV, treating the first record as headings, and submit one
/// DGRP per remaining record in file order. Progress goes to `out`.
///
/// Fields are taken as raw bytes; no encoding is assumed. Rows whose field
/// count differs from the headings are reported and skipped. Submission
/// errors are reported and the next row is processed. Only an I/O failure
/// on the input or on `out` stops the run.
pub fn run<R, S, W>(input: R, api: &S, out: &mut W) -> Result<ImportSummary>
where
    R: Read,
    S: Submit + ?Sized,
    W: Write,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut summary = ImportSummary::default();
    let mut headings: Option<Vec<Vec<u8>>> = None;

    for result in reader.byte_records() {
        let record = result?;
        let row: Vec<&[u8]> = record.iter().collect();

        let columns = match &headings {
            Some(columns) => columns,
            None => {
                headings = Some(row.iter().map(|f| f.to_vec()).collect());
                continue;
            }
        };

        let dgrp = match map_row(columns.as_slice(), row.as_slice()) {
            Ok(dgrp) => dgrp,
            Err(e) => {
                let shown = show_row(&row);
                log::debug!("{}: {}", e, shown);
                writeln!(out, "Error mapping row: {}. Skipping {}", e, shown)?;
                summary.skipped += 1;
                continue;
            }
        };

        write!(out, "{}: ", dgrp.name())?;
        match api.submit(&dgrp) {
            Ok(reply) => {
                writeln!(out, "{}", reply)?;
                summary.submitted += 1;
            }
            Err(e) => {
                log::debug!("submission failed: {:#}", e);
                writeln!(out, "{:#}", e)?;
                summary.failed += 1;
            }
        }
    }

    writeln!(out, "End of file")?;
    Ok(summary)
}

/// `[a b c]`
fn show_row(row: &[&[u8]]) -> String {
    let fields: Vec<_> = row.iter().map(|f| String::from_utf8_lossy(f)).collect();
    format!("[{}]", fields.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Reply;
    use crate::dgrp::Dgrp;
    use std::cell::RefCell;

    /// Records every DGRP it is given; fails for names listed in `reject`.
    #[derive(Default)]
    struct FakeApi {
        seen: RefCell<Vec<Dgrp>>,
        reject: Vec<&'static str>,
    }

    impl Submit for FakeApi {
        fn submit(&self, dgrp: &Dgrp) -> anyhow::Result<Reply> {
            self.seen.borrow_mut().push(dgrp.clone());
            let name = dgrp.name();
            if self.reject.iter().any(|r| name == *r) {
                anyhow::bail!("connection refused");
            }
            Ok(Reply {
                status: "201 Created".into(),
                body: format!("created {}", name),
            })
        }
    }

    fn import(csv: &str, api: &FakeApi) -> (ImportSummary, String) {
        let mut out = Vec::new();
        let summary = run(csv.as_bytes(), api, &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_submits_each_row_in_order() {
        let api = FakeApi::default();
        let (summary, out) = import("dgrpName,type\ngrpA,core\ngrpB,edge\n", &api);

        let seen = api.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].name(), "grpA");
        assert_eq!(seen[0].field("type").as_deref(), Some("core"));
        assert_eq!(seen[1].name(), "grpB");
        assert_eq!(
            summary,
            ImportSummary {
                submitted: 2,
                failed: 0,
                skipped: 0
            }
        );
        assert_eq!(
            out,
            "grpA: 201 Created...created grpA\n\
             grpB: 201 Created...created grpB\n\
             End of file\n"
        );
    }

    #[test]
    fn test_mismatched_row_is_skipped() {
        let api = FakeApi::default();
        let (summary, out) = import("dgrpName,type\ngrpA,core\ngrpB\n", &api);

        assert_eq!(api.seen.borrow().len(), 1);
        assert_eq!(summary.submitted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(out.matches("Skipping").count(), 1);
        assert!(out.contains("Error mapping row: Incorrect number of fields. Skipping [grpB]"));
        assert!(out.ends_with("End of file\n"));
    }

    #[test]
    fn test_skipped_row_does_not_stop_later_rows() {
        let api = FakeApi::default();
        let (summary, _) = import("dgrpName,type\na,b,c\ngrpC,core\n", &api);

        assert_eq!(api.seen.borrow().len(), 1);
        assert_eq!(api.seen.borrow()[0].name(), "grpC");
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_failed_submission_continues() {
        let api = FakeApi {
            reject: vec!["grpA"],
            ..Default::default()
        };
        let (summary, out) = import("dgrpName\ngrpA\ngrpB\n", &api);

        assert_eq!(api.seen.borrow().len(), 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.submitted, 1);
        assert!(out.starts_with("grpA: connection refused\n"));
        assert!(out.contains("grpB: 201 Created"));
    }

    #[test]
    fn test_empty_input() {
        let api = FakeApi::default();
        let (summary, out) = import("", &api);

        assert!(api.seen.borrow().is_empty());
        assert_eq!(summary, ImportSummary::default());
        assert_eq!(out, "End of file\n");
    }

    #[test]
    fn test_headings_only() {
        let api = FakeApi::default();
        let (_, out) = import("dgrpName,type\n", &api);

        assert!(api.seen.borrow().is_empty());
        assert_eq!(out, "End of file\n");
    }

    #[test]
    fn test_quoted_fields() {
        let api = FakeApi::default();
        import("dgrpName,desc\n\"grp, A\",\"says \"\"hi\"\"\"\n", &api);

        let seen = api.seen.borrow();
        assert_eq!(seen[0].name(), "grp, A");
        assert_eq!(seen[0].field("desc").as_deref(), Some("says \"hi\""));
    }

    #[test]
    fn test_non_utf8_row_is_submitted() {
        let api = FakeApi::default();
        let mut out = Vec::new();
        let summary = run(&b"dgrpName,desc\ngrpA,caf\xe9\n"[..], &api, &mut out).unwrap();

        assert_eq!(summary.submitted, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(api.seen.borrow()[0].get("desc"), Some(&b"caf\xe9"[..]));
    }

    #[test]
    fn test_non_utf8_heading_is_kept() {
        let api = FakeApi::default();
        let mut out = Vec::new();
        let summary = run(&b"dgrpName,d\xe9sc\ngrpA,x\n"[..], &api, &mut out).unwrap();

        assert_eq!(summary.submitted, 1);
        let seen = api.seen.borrow();
        assert_eq!(seen[0].iter().nth(1), Some((&b"d\xe9sc"[..], &b"x"[..])));
    }

    #[test]
    fn test_skip_message_lists_fields() {
        let api = FakeApi::default();
        let (_, out) = import("dgrpName,type\ngrpA,core,extra\n", &api);

        assert_eq!(
            out,
            "Error mapping row: Incorrect number of fields. Skipping [grpA core extra]\n\
             End of file\n"
        );
    }
}
