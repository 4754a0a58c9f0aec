// API client module: a small blocking HTTP client that creates device
// groups in the config API. One request per DGRP, no retries.

use std::fmt;

use anyhow::{Context, Result};
use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};

use crate::cli::Config;
use crate::dgrp::Dgrp;

/// Bytes left as-is in a query component; space becomes `+` afterwards.
const QUERY_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

/// Basic-auth credentials captured at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// What came back from the API: the status line and the trimmed body.
/// The status is reported as-is; a 4xx is still a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: String,
    pub body: String,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}...{}", self.status, self.body)
    }
}

/// Anything that can create a DGRP. `ApiClient` is the real one; the
/// import loop only needs this.
pub trait Submit {
    fn submit(&self, dgrp: &Dgrp) -> Result<Reply>;
}

/// Holds a reqwest blocking client, the API base URL, the IGRP the
/// groups are created under and the basic-auth credentials.
pub struct ApiClient {
    client: Client,
    base_url: String,
    igrp: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.base.clone(),
            igrp: config.igrp.clone(),
            credentials,
        })
    }

    /// POST the DGRP as query parameters to the IGRP's dgrps collection.
    pub fn create_dgrp(&self, dgrp: &Dgrp) -> Result<Reply> {
        let url = dgrp_url(&self.base_url, &self.igrp, dgrp)?;
        log::debug!("POST {}", url);

        let res = self
            .client
            .post(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .context("Failed to send create request")?;

        let status = status_line(res.status());
        let body = res.text().context("Failed to read response body")?;
        Ok(Reply {
            status,
            body: body.trim().to_string(),
        })
    }
}

impl Submit for ApiClient {
    fn submit(&self, dgrp: &Dgrp) -> Result<Reply> {
        self.create_dgrp(dgrp)
    }
}

/// `<base>/v2/igrps/<igrp>/dgrps/?<fields>`, with one trailing slash
/// dropped from `base`.
pub fn dgrp_url(base: &str, igrp: &str, dgrp: &Dgrp) -> Result<Url> {
    let raw = format!(
        "{}/v2/igrps/{}/dgrps/?{}",
        base.strip_suffix('/').unwrap_or(base),
        igrp,
        encode_query(dgrp)
    );
    Url::parse(&raw).with_context(|| format!("Invalid API URL {}", raw))
}

/// `key=value` pairs joined by `&`, in key order. Everything but
/// `A-Za-z0-9-_.~` is percent-encoded byte by byte, and space is `+`.
pub fn encode_query(dgrp: &Dgrp) -> String {
    dgrp.iter()
        .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn escape(bytes: &[u8]) -> String {
    percent_encode(bytes, QUERY_KEEP).to_string().replace(' ', "+")
}

/// `201 Created`, or just the code when it has no standard reason.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_str(), reason),
        None => status.as_str().to_string(),
    }
}
