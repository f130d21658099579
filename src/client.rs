//! HTTP client facade: `head`/`get` over a pluggable transport, with
//! timeouts, user-agent, and configured extra headers/cookies applied uniformly.

use crate::error::{HttpError, TransportError};
use async_trait::async_trait;
use http::HeaderMap;
use std::time::Duration;

/// A fetched response body plus its headers and, when the response carried a 4xx/5xx
/// status, the bucketed [`HttpError`] describing it. The body is always populated so
/// callers can best-effort parse it regardless of HTTP status.
pub struct FetchedBody {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub error: Option<HttpError>,
}

/// The engine's only dependency on the transport layer. Implementations must apply
/// `User-Agent`, the default Accept/Accept-Language/Cache-Control trio, and any
/// configured extra headers/cookies to every request.
///
/// `head`/`get` only fail on [`TransportError`] (connection, TLS, timeout); HTTP-level
/// 4xx/5xx failures are reported via `HeaderMap`/[`FetchedBody::error`] instead, so the
/// caller can still read headers or best-effort-parse the body.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn head(&self, url: &str) -> Result<(HeaderMap, Option<HttpError>), TransportError>;
    async fn get(&self, url: &str) -> Result<FetchedBody, TransportError>;
}

/// Production adapter built on `reqwest`.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

struct ParsedHeader {
    key: String,
    val: String,
}

fn prepare_headers(raw: &[String]) -> Vec<ParsedHeader> {
    raw.iter()
        .filter_map(|h| {
            let (key, val) = h.split_once(':')?;
            let key = key.trim();
            let val = val.trim();
            if key.is_empty() || val.is_empty() {
                return None;
            }
            Some(ParsedHeader {
                key: key.to_string(),
                val: val.to_string(),
            })
        })
        .collect()
}

struct ParsedCookie {
    name: String,
    value: String,
}

fn prepare_cookies(raw: &[String]) -> Vec<ParsedCookie> {
    raw.iter()
        .flat_map(|r| r.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(ParsedCookie {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

impl ReqwestHttpClient {
    pub fn new(
        user_agent: &str,
        workers: usize,
        timeout: Duration,
        skip_ssl: bool,
        extra_headers: &[String],
        extra_cookies: &[String],
    ) -> Result<Self, TransportError> {
        let headers = prepare_headers(extra_headers);
        let cookies = prepare_cookies(extra_cookies);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            http::header::ACCEPT,
            "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5"
                .parse()
                .expect("static header value parses"),
        );
        default_headers.insert(
            http::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.8".parse().expect("static header value parses"),
        );
        default_headers.insert(
            http::header::CACHE_CONTROL,
            "no-cache".parse().expect("static header value parses"),
        );

        for h in &headers {
            if let (Ok(name), Ok(val)) = (
                http::HeaderName::try_from(h.key.as_str()),
                http::HeaderValue::from_str(&h.val),
            ) {
                default_headers.insert(name, val);
            }
        }

        if !cookies.is_empty() {
            let cookie_header = cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; ");
            if let Ok(val) = http::HeaderValue::from_str(&cookie_header) {
                default_headers.insert(http::header::COOKIE, val);
            }
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(default_headers)
            .timeout(timeout)
            .pool_max_idle_per_host(workers)
            .danger_accept_invalid_certs(skip_ssl)
            .build()
            .map_err(TransportError)?;

        Ok(Self { client })
    }

    fn status_error(status: reqwest::StatusCode) -> Option<HttpError> {
        if status.is_success() || status.is_redirection() {
            None
        } else {
            Some(HttpError::from_status(status))
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn head(&self, url: &str) -> Result<(HeaderMap, Option<HttpError>), TransportError> {
        let resp = self
            .client
            .head(url)
            .send()
            .await
            .map_err(TransportError)?;

        let error = Self::status_error(resp.status());
        Ok((resp.headers().clone(), error))
    }

    async fn get(&self, url: &str) -> Result<FetchedBody, TransportError> {
        let resp = self.client.get(url).send().await.map_err(TransportError)?;
        let error = Self::status_error(resp.status());
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(TransportError)?.to_vec();

        Ok(FetchedBody {
            headers,
            body,
            error,
        })
    }
}
