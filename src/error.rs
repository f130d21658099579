//! Error taxonomy for hostcrawl.
//!
//! Only [`CrawlError`] ever surfaces from [`crate::engine::Crawler::run`]. Per-URL
//! failures (HTTP, transport, parse) are absorbed by workers as log events and never
//! cross a channel boundary as a value.

use thiserror::Error;

/// Fatal errors that can abort a crawl before or during startup.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL failed to parse.
    #[error("invalid seed url `{url}`: {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// An option string did not map to a known policy variant.
    #[error("unknown policy value `{value}` for {field}")]
    PolicyUnknown { field: &'static str, value: String },
}

/// Non-fatal per-request HTTP failure, bucketed to a 400 or 500 class code.
#[derive(Debug, Error)]
#[error("http error {code}: {status_text}")]
pub struct HttpError {
    pub code: u16,
    pub status_text: String,
}

impl HttpError {
    pub fn from_status(status: http::StatusCode) -> Self {
        let code = if status.as_u16() >= 500 {
            500
        } else {
            400
        };

        Self {
            code,
            status_text: status.to_string(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.code == 500
    }
}

/// Transport-level failure: connection, TLS, timeout, or request build errors.
#[derive(Debug, Error)]
#[error("transport error: {0}")]
pub struct TransportError(#[from] pub reqwest::Error);
