use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};

pub const DEFAULT_BASE: &str = "https://api.infinitycloud.com/config/";

const LONG_FLAGS: [&str; 3] = ["file", "igrp", "base"];

/// Create one DGRP per row of a CSV file under an IGRP.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// Input file
    #[arg(long)]
    pub file: Option<String>,

    /// IGRP ID
    #[arg(long)]
    pub igrp: Option<String>,

    /// API base URL
    #[arg(long, default_value = DEFAULT_BASE)]
    pub base: String,
}

/// Validated run settings, fixed for the whole import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: PathBuf,
    pub igrp: String,
    pub base: String,
}

impl Args {
    /// Parse from an argument list that may use the single-dash long
    /// flags (`-file x`, `-igrp=y`) as well as the `--file` spelling.
    pub fn parse_compat<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Args::parse_from(normalize(args))
    }

    /// Check the required flags and that the input file exists.
    pub fn into_config(self) -> Result<Config> {
        let file = self
            .file
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .ok_or(Error::MissingFile)?;
        let igrp = self
            .igrp
            .filter(|i| !i.is_empty())
            .ok_or(Error::MissingIgrp)?;

        std::fs::metadata(&file).map_err(|source| Error::Stat {
            path: file.clone(),
            source,
        })?;

        Ok(Config {
            file,
            igrp,
            base: self.base,
        })
    }
}

/// Rewrite `-file`, `-igrp` and `-base` (optionally with `=value`) into
/// their `--` form. Anything else is passed through untouched.
pub fn normalize<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|s| {
                let flag = s.strip_prefix('-')?;
                if flag.starts_with('-') {
                    return None;
                }
                let name = flag.split('=').next().unwrap_or(flag);
                LONG_FLAGS.contains(&name).then(|| format!("-{}", s))
            });
            rewritten.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}
