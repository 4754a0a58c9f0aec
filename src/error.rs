use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing input file")]
    MissingFile,
    #[error("Missing IGRP ID")]
    MissingIgrp,
    #[error("stat {}", .path.display())]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Incorrect number of fields")]
    FieldCount { expected: usize, found: usize },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
