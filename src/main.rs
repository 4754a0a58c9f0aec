// Entrypoint for the CLI application.
// - Keeps `main` small: validate flags, ask for credentials, build the API
//   client and hand the input file to the import loop.
// - Every failure is printed to stdout; the exit status stays 0.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::Context;
use dgrp_import::{api::ApiClient, cli::Args, import, ui};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Starting...");
    if let Err(e) = run() {
        println!("{:#}", e);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Args::parse_compat(std::env::args_os()).into_config()?;
    let file = File::open(&config.file)
        .with_context(|| format!("open {}", config.file.display()))?;

    let credentials = ui::prompt_credentials()?;
    let api = ApiClient::new(&config, credentials)?;
    log::debug!("importing {} into igrp {}", config.file.display(), config.igrp);

    let stdout = io::stdout();
    let summary = import::run(
        BufReader::new(file),
        &ui::WithSpinner(&api),
        &mut stdout.lock(),
    )?;
    log::info!(
        "{} submitted, {} failed, {} skipped",
        summary.submitted,
        summary.failed,
        summary.skipped
    );
    Ok(())
}
