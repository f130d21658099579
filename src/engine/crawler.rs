//! The crawl engine: worker pool, coordinator, emitter, wired over three
//! bounded channels. This is the core the rest of the crate exists to support.

use super::task::{Task, TaskFlag};
use crate::client::HttpClient;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::extract::html::{extract_html, HtmlFlags};
use crate::extract::sitemap::extract_sitemap;
use crate::extract::{css, js, DiscoveryKind};
use crate::policy::{DirsPolicy, RobotsPolicy};
use crate::robots::{robots_url, RobotsTxt};
use crate::url_util::{
    can_parse_without_head, fingerprint, in_scope, is_css, is_html, is_js, is_resource,
    is_sitemap, normalize,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

const BOUNDED_WAIT: Duration = Duration::from_millis(100);

/// Breadth-first, same-host crawler driving a pluggable [`HttpClient`].
pub struct Crawler<C: HttpClient> {
    config: CrawlConfig,
    client: Arc<C>,
}

impl<C: HttpClient + 'static> Crawler<C> {
    pub fn new(mut config: CrawlConfig, client: C) -> Self {
        config.validate();
        Self {
            config,
            client: Arc::new(client),
        }
    }

    /// Run a full crawl from `seed`, calling `sink` once per emitted URL. Only
    /// [`CrawlError::InvalidSeed`] surfaces here; every per-URL failure is logged and
    /// absorbed.
    pub async fn run(
        &self,
        seed: &str,
        mut sink: impl FnMut(String) + Send + 'static,
    ) -> Result<(), CrawlError> {
        let seed_url = Url::parse(seed).map_err(|source| CrawlError::InvalidSeed {
            url: seed.to_string(),
            source,
        })?;

        let mut seen = HashSet::new();
        seen.insert(fingerprint(seed_url.as_str()));

        let n = self.config.workers + 1;
        let cap = n * 256;

        let (crawl_tx, crawl_rx) = async_channel::bounded::<String>(cap);
        let (result_tx, result_rx) = mpsc::channel::<Task>(cap);
        let (handle_tx, handle_rx) = mpsc::channel::<String>(cap);

        let robots = init_robots(
            self.client.as_ref(),
            &seed_url,
            &self.config,
            result_tx.clone(),
        )
        .await;
        let robots = Arc::new(robots);

        let mut worker_handles = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            worker_handles.push(tokio::spawn(worker_loop(
                id,
                crawl_rx.clone(),
                result_tx.clone(),
                Arc::clone(&self.client),
                self.config.clone(),
            )));
        }
        drop(result_tx);

        let emitter_handle = tokio::spawn(emitter_loop(handle_rx, move |url| sink(url)));

        let coordinator_handle = tokio::spawn(coordinator_loop(
            result_rx,
            crawl_tx.clone(),
            handle_tx,
            seen,
            robots,
            self.config.clone(),
            seed_url.clone(),
        ));

        if crawl_tx.send(seed_url.to_string()).await.is_err() {
            warn!("crawl-queue closed before seed could be pushed");
        }
        drop(crawl_tx);

        let _ = coordinator_handle.await;
        for h in worker_handles {
            let _ = h.await;
        }
        let _ = emitter_handle.await;

        Ok(())
    }
}

/// Robots initialization. Returns the installed policy and, as a side
/// effect, injects harvested links/sitemaps onto `result_tx` as crawlable anchors.
async fn init_robots(
    client: &dyn HttpClient,
    seed: &Url,
    config: &CrawlConfig,
    result_tx: mpsc::Sender<Task>,
) -> RobotsTxt {
    if config.robots_policy == RobotsPolicy::Ignore {
        return RobotsTxt::allow_all();
    }

    let url = robots_url(seed);
    let fetched = match client.get(&url).await {
        Ok(f) => f,
        Err(e) => {
            warn!(url = %url, error = %e, "robots.txt fetch failed, defaulting to allow-all");
            return RobotsTxt::allow_all();
        }
    };

    if let Some(err) = &fetched.error {
        if err.is_server_error() {
            warn!(url = %url, "robots.txt returned server error, switching to deny-all");
            return RobotsTxt::deny_all();
        }
    }

    let txt = match RobotsTxt::from_reader(&config.user_agent, fetched.body.as_slice()) {
        Ok(txt) => txt,
        Err(e) => {
            warn!(url = %url, error = %e, "robots.txt parse error, defaulting to allow-all");
            return RobotsTxt::allow_all();
        }
    };

    for link in txt.links().chain(txt.sitemaps()) {
        if let Some(task) = on_link(seed, DiscoveryKind::Anchor, link, config.scan_js, &config.ignore_patterns) {
            let _ = result_tx.send(task).await;
        }
    }

    txt
}

async fn worker_loop(
    id: usize,
    crawl_rx: async_channel::Receiver<String>,
    result_tx: mpsc::Sender<Task>,
    client: Arc<dyn HttpClient>,
    config: CrawlConfig,
) {
    debug!(id, "worker started");
    while let Ok(url) = crawl_rx.recv().await {
        process_one(&url, client.as_ref(), &config, &result_tx).await;
    }
    debug!(id, "worker exiting, crawl-queue closed");
}

async fn process_one(
    url: &str,
    client: &dyn HttpClient,
    config: &CrawlConfig,
    result_tx: &mpsc::Sender<Task>,
) {
    if !config.delay.is_zero() {
        tokio::time::sleep(config.delay).await;
    }

    let mut head_content_type: Option<String> = None;

    let can_process = if config.no_head {
        let path = Url::parse(url).map(|u| u.path().to_string()).unwrap_or_default();
        can_parse_without_head(&path)
    } else {
        match client.head(url).await {
            Ok((headers, _status_err)) => {
                let ct = content_type_of(&headers);
                let allowed = is_html(ct.as_deref())
                    || is_sitemap(url)
                    || (config.scan_js && is_js(ct.as_deref(), url))
                    || (config.scan_css && is_css(ct.as_deref(), url));
                head_content_type = ct;
                allowed
            }
            Err(e) => {
                warn!(url, error = %e, "HEAD request failed");
                false
            }
        }
    };

    if can_process {
        match client.get(url).await {
            Ok(fetched) => {
                if let Some(err) = &fetched.error {
                    warn!(url, code = err.code, "non-2xx/3xx response, parsing body best-effort");
                }
                let ct = content_type_of(&fetched.headers).or(head_content_type);
                dispatch_body(&fetched.body, ct.as_deref(), url, config, result_tx).await;
            }
            Err(e) => warn!(url, error = %e, "GET failed"),
        }
    }

    let _ = result_tx.send(Task::done()).await;
}

fn content_type_of(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn dispatch_body(
    body: &[u8],
    ct: Option<&str>,
    url: &str,
    config: &CrawlConfig,
    result_tx: &mpsc::Sender<Task>,
) {
    let base = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return,
    };

    let mut discoveries: Vec<(DiscoveryKind, String)> = Vec::new();

    if is_html(ct) {
        let flags = HtmlFlags {
            brute: config.brute,
            scan_js: config.scan_js,
            scan_css: config.scan_css,
            tag_filter: config.tag_filter.clone(),
        };
        extract_html(body, &base, &flags, |kind, u| discoveries.push((kind, u)));
    } else if is_sitemap(url) {
        extract_sitemap(body, &base, |u| {
            discoveries.push((DiscoveryKind::Anchor, u));
        });
    } else if config.scan_js && is_js(ct, url) {
        js::extract_js(body, &base, |u| {
            discoveries.push((DiscoveryKind::Script, u));
        });
    } else if config.scan_css && is_css(ct, url) {
        css::extract_css(body, &base, |u| {
            discoveries.push((DiscoveryKind::Static("css"), u));
        });
    }

    for (kind, raw) in discoveries {
        if let Some(task) = on_link(&base, kind, &raw, config.scan_js, &config.ignore_patterns) {
            let _ = tokio::time::timeout(BOUNDED_WAIT, result_tx.send(task)).await;
        }
    }
}

/// Normalize a discovered URL, fingerprint it, and decide crawlability.
fn on_link(
    base: &Url,
    kind: DiscoveryKind,
    raw: &str,
    scan_js: bool,
    ignore_patterns: &[String],
) -> Option<Task> {
    let url = normalize(base, raw)?;
    let fp = fingerprint(&url);
    let crawlable =
        kind.is_crawlable(scan_js) && !ignore_patterns.iter().any(|p| url.contains(p.as_str()));
    let flag = if crawlable { TaskFlag::Crawl } else { TaskFlag::Default };
    Some(Task::new(url, fp, flag))
}

async fn coordinator_loop(
    mut result_rx: mpsc::Receiver<Task>,
    crawl_tx: async_channel::Sender<String>,
    handle_tx: mpsc::Sender<String>,
    mut seen: HashSet<u64>,
    robots: Arc<RobotsTxt>,
    config: CrawlConfig,
    seed: Url,
) {
    let mut w: i64 = 1;

    while w > 0 {
        let Some(t) = result_rx.recv().await else {
            break;
        };

        if t.flag == TaskFlag::Done {
            w -= 1;
            continue;
        }

        if !seen.insert(t.fingerprint) {
            continue;
        }

        if t.flag == TaskFlag::Crawl
            && try_enqueue_crawl(&t.url, &seed, &config, &robots, &crawl_tx).await
        {
            w += 1;
        }

        try_emit(&t.url, &config, &handle_tx).await;
    }

    info!("coordinator done, frontier exhausted");
}

async fn try_enqueue_crawl(
    url: &str,
    seed: &Url,
    config: &CrawlConfig,
    robots: &RobotsTxt,
    crawl_tx: &async_channel::Sender<String>,
) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    if !in_scope(seed, &parsed, config.depth) {
        return false;
    }

    if config.robots_policy == RobotsPolicy::Respect && robots.forbidden(parsed.path()) {
        return false;
    }

    if config.dirs_policy == DirsPolicy::Only && is_resource(parsed.path()) {
        return false;
    }

    matches!(
        tokio::time::timeout(BOUNDED_WAIT, crawl_tx.send(url.to_string())).await,
        Ok(Ok(()))
    )
}

async fn try_emit(url: &str, config: &CrawlConfig, handle_tx: &mpsc::Sender<String>) {
    let last_segment = url.rsplit('/').next().unwrap_or("");
    let resource = is_resource(last_segment);

    let visible = match config.dirs_policy {
        DirsPolicy::Show => true,
        DirsPolicy::Hide => resource,
        DirsPolicy::Only => !resource,
    };

    if visible {
        let _ = tokio::time::timeout(BOUNDED_WAIT, handle_tx.send(url.to_string())).await;
    }
}

async fn emitter_loop(mut handle_rx: mpsc::Receiver<String>, mut sink: impl FnMut(String)) {
    while let Some(url) = handle_rx.recv().await {
        sink(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_link_marks_anchor_crawlable() {
        let seed = Url::parse("https://example.com/").unwrap();
        let task = on_link(&seed, DiscoveryKind::Anchor, "/a", false, &[]).unwrap();
        assert_eq!(task.flag, TaskFlag::Crawl);
    }

    #[test]
    fn on_link_marks_static_as_default() {
        let seed = Url::parse("https://example.com/").unwrap();
        let task = on_link(&seed, DiscoveryKind::Static("img"), "/a.png", false, &[]).unwrap();
        assert_eq!(task.flag, TaskFlag::Default);
    }

    #[test]
    fn on_link_downgrades_script_without_scan_js() {
        let seed = Url::parse("https://example.com/").unwrap();
        let task = on_link(&seed, DiscoveryKind::Script, "/x.js", false, &[]).unwrap();
        assert_eq!(task.flag, TaskFlag::Default);
    }

    #[test]
    fn on_link_upgrades_script_with_scan_js() {
        let seed = Url::parse("https://example.com/").unwrap();
        let task = on_link(&seed, DiscoveryKind::Script, "/x.js", true, &[]).unwrap();
        assert_eq!(task.flag, TaskFlag::Crawl);
    }

    #[test]
    fn on_link_respects_ignore_patterns() {
        let seed = Url::parse("https://example.com/").unwrap();
        let task = on_link(&seed, DiscoveryKind::Anchor, "/admin/x", false, &["/admin".to_string()]).unwrap();
        assert_eq!(task.flag, TaskFlag::Default);
    }

    #[test]
    fn on_link_drops_unresolvable_raw() {
        let seed = Url::parse("https://example.com/").unwrap();
        assert!(on_link(&seed, DiscoveryKind::Anchor, "javascript:void(0)", false, &[]).is_none());
    }
}
