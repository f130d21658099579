//! Typed configuration bag with validation/clamping.

use crate::policy::{DirsPolicy, RobotsPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const MIN_WORKERS: usize = 1;
const MAX_WORKERS: usize = 64;
const MIN_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Full set of knobs accepted by [`crate::engine::Crawler`].
///
/// Construct with [`CrawlConfig::new`] then mutate fields directly, or use
/// [`CrawlConfigBuilder`] for fluent construction. Always call [`CrawlConfig::validate`]
/// (done automatically by the builder and by `Crawler::new`) before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    pub workers: usize,
    pub depth: i64,
    pub delay: Duration,
    pub timeout: Duration,
    pub robots_policy: RobotsPolicy,
    pub dirs_policy: DirsPolicy,
    pub brute: bool,
    pub no_head: bool,
    pub scan_js: bool,
    pub scan_css: bool,
    pub tag_filter: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub extra_headers: Vec<String>,
    pub extra_cookies: Vec<String>,
    pub user_agent: String,
    pub skip_ssl: bool,
    pub proxy_auth: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus(),
            depth: 0,
            delay: Duration::from_millis(150),
            timeout: Duration::from_secs(5),
            robots_policy: RobotsPolicy::default(),
            dirs_policy: DirsPolicy::default(),
            brute: false,
            no_head: false,
            scan_js: false,
            scan_css: false,
            tag_filter: Vec::new(),
            ignore_patterns: Vec::new(),
            extra_headers: Vec::new(),
            extra_cookies: Vec::new(),
            user_agent: format!("hostcrawl/{}", env!("CARGO_PKG_VERSION")),
            skip_ssl: false,
            proxy_auth: None,
        }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp out-of-range values in place: `workers` to `[1, 64]`, `depth` to `[-1, ..)`,
    /// `timeout` to `[1s, 10min]`. `delay` has no upper bound and is left untouched.
    pub fn validate(&mut self) {
        self.workers = self.workers.clamp(MIN_WORKERS, MAX_WORKERS);

        if self.depth < -1 {
            self.depth = -1;
        }

        if self.timeout < MIN_TIMEOUT {
            self.timeout = MIN_TIMEOUT;
        } else if self.timeout > MAX_TIMEOUT {
            self.timeout = MAX_TIMEOUT;
        }
    }

    /// `user:pass` proxy credentials, base64-encoded into a `Proxy-Authorization` header
    /// and appended to `extra_headers` at config-build time.
    pub fn with_proxy_auth(mut self, creds: impl Into<String>) -> Self {
        let creds = creds.into();
        if !creds.is_empty() {
            use base64::Engine as _;
            let encoded = base64::engine::general_purpose::STANDARD.encode(creds.as_bytes());
            self.extra_headers
                .push(format!("Proxy-Authorization: Basic {encoded}"));
        }
        self
    }
}

impl fmt::Display for CrawlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workers: {} depth: {}", self.workers, self.depth)?;

        if self.brute {
            write!(f, " brute: on")?;
        }

        if self.scan_js {
            write!(f, " js: on")?;
        }

        if self.scan_css {
            write!(f, " css: on")?;
        }

        if !self.delay.is_zero() {
            write!(f, " delay: {:?}", self.delay)?;
        }

        write!(f, " robots: {} dirs: {}", self.robots_policy, self.dirs_policy)
    }
}

/// Fluent constructor mirroring the original's `Option`-function pattern, kept as an
/// ergonomic layer over the plain struct rather than the source of truth.
#[derive(Debug, Default)]
pub struct CrawlConfigBuilder {
    cfg: CrawlConfig,
}

impl CrawlConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: CrawlConfig::default(),
        }
    }

    pub fn workers(mut self, v: usize) -> Self {
        self.cfg.workers = v;
        self
    }

    pub fn depth(mut self, v: i64) -> Self {
        self.cfg.depth = v;
        self
    }

    pub fn delay(mut self, v: Duration) -> Self {
        self.cfg.delay = v;
        self
    }

    pub fn timeout(mut self, v: Duration) -> Self {
        self.cfg.timeout = v;
        self
    }

    pub fn robots_policy(mut self, v: RobotsPolicy) -> Self {
        self.cfg.robots_policy = v;
        self
    }

    pub fn dirs_policy(mut self, v: DirsPolicy) -> Self {
        self.cfg.dirs_policy = v;
        self
    }

    pub fn brute(mut self, v: bool) -> Self {
        self.cfg.brute = v;
        self
    }

    pub fn no_head(mut self, v: bool) -> Self {
        self.cfg.no_head = v;
        self
    }

    pub fn scan_js(mut self, v: bool) -> Self {
        self.cfg.scan_js = v;
        self
    }

    pub fn scan_css(mut self, v: bool) -> Self {
        self.cfg.scan_css = v;
        self
    }

    pub fn tag_filter(mut self, v: Vec<String>) -> Self {
        self.cfg.tag_filter = v;
        self
    }

    pub fn ignore_patterns(mut self, v: Vec<String>) -> Self {
        self.cfg.ignore_patterns = v;
        self
    }

    pub fn extra_headers(mut self, v: Vec<String>) -> Self {
        self.cfg.extra_headers = v;
        self
    }

    pub fn extra_cookies(mut self, v: Vec<String>) -> Self {
        self.cfg.extra_cookies = v;
        self
    }

    pub fn user_agent(mut self, v: impl Into<String>) -> Self {
        self.cfg.user_agent = v.into();
        self
    }

    pub fn skip_ssl(mut self, v: bool) -> Self {
        self.cfg.skip_ssl = v;
        self
    }

    pub fn proxy_auth(mut self, v: impl Into<String>) -> Self {
        self.cfg = self.cfg.with_proxy_auth(v.into());
        self
    }

    pub fn build(mut self) -> CrawlConfig {
        self.cfg.validate();
        self.cfg
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_workers_into_range() {
        let mut cfg = CrawlConfig {
            workers: 0,
            ..CrawlConfig::default()
        };
        cfg.validate();
        assert_eq!(cfg.workers, MIN_WORKERS);

        let mut cfg = CrawlConfig {
            workers: 1000,
            ..CrawlConfig::default()
        };
        cfg.validate();
        assert_eq!(cfg.workers, MAX_WORKERS);
    }

    #[test]
    fn clamps_depth_floor_to_unbounded() {
        let mut cfg = CrawlConfig {
            depth: -5,
            ..CrawlConfig::default()
        };
        cfg.validate();
        assert_eq!(cfg.depth, -1);
    }

    #[test]
    fn clamps_timeout_into_range() {
        let mut cfg = CrawlConfig {
            timeout: Duration::from_millis(1),
            ..CrawlConfig::default()
        };
        cfg.validate();
        assert_eq!(cfg.timeout, MIN_TIMEOUT);

        let mut cfg = CrawlConfig {
            timeout: Duration::from_secs(3600),
            ..CrawlConfig::default()
        };
        cfg.validate();
        assert_eq!(cfg.timeout, MAX_TIMEOUT);
    }

    #[test]
    fn proxy_auth_appends_basic_header() {
        let cfg = CrawlConfig::default().with_proxy_auth("user:pass");
        assert_eq!(cfg.extra_headers.len(), 1);
        assert!(cfg.extra_headers[0].starts_with("Proxy-Authorization: Basic "));
    }

    #[test]
    fn empty_proxy_auth_is_noop() {
        let cfg = CrawlConfig::default().with_proxy_auth("");
        assert!(cfg.extra_headers.is_empty());
    }

    #[test]
    fn builder_validates_on_build() {
        let cfg = CrawlConfigBuilder::new().workers(9999).build();
        assert_eq!(cfg.workers, MAX_WORKERS);
    }
}
