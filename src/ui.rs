// UI layer: terminal prompts via `dialoguer` and a spinner via `indicatif`
// while a request is in flight.

use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{Credentials, Reply, Submit};
use crate::dgrp::Dgrp;

/// Ask for the username (plain line) and the password (no echo). Both are
/// trimmed; either read failing aborts.
pub fn prompt_credentials() -> Result<Credentials> {
    let username: String = Input::new()
        .with_prompt("Enter username")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read username")?;

    // `Password` hides input in terminal for passwords.
    let password = Password::new()
        .with_prompt("Enter password")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read password")?;

    Ok(Credentials {
        username: username.trim().to_string(),
        password: password.trim().to_string(),
    })
}

/// Wraps a submitter and shows a spinner labelled with the DGRP name for
/// the duration of each call. The spinner is cleared before returning, so
/// the caller's output line is not interleaved with it.
pub struct WithSpinner<'a, S>(pub &'a S);

impl<S: Submit> Submit for WithSpinner<'_, S> {
    fn submit(&self, dgrp: &Dgrp) -> Result<Reply> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner());
        spinner.set_message(format!("Creating {}...", dgrp.name()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let res = self.0.submit(dgrp);
        spinner.finish_and_clear();
        res
    }
}
