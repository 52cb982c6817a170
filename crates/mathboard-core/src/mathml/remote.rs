//! Optional online grammar check.
//!
//! Posts the fragment to a markup validator and maps its answer through
//! [`parse_html_report`]. Every transport or HTTP failure degrades to
//! [`RemoteOutcome::Unavailable`]; a remote check never fails a pipeline.

use super::report::{parse_html_report, xhtml_document, RemoteOutcome};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://validator.w3.org/check";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct RemoteValidator {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl RemoteValidator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mathboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn check(&self, mathml: &str) -> RemoteOutcome {
        match self.fetch_report(mathml) {
            Ok(html) => parse_html_report(&html),
            Err(e) => {
                log::warn!("remote validation unavailable: {}", e);
                RemoteOutcome::Unavailable(e.to_string())
            }
        }
    }

    fn fetch_report(&self, mathml: &str) -> Result<String, RemoteError> {
        let document = xhtml_document(mathml);
        let html = self
            .client
            .post(&self.endpoint)
            .form(&[("fragment", document.as_str()), ("output", "html")])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(html)
    }
}
