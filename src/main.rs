//! `hostcrawl` CLI: a thin driver over [`hostcrawl::Crawler`] implementing its flag
//! surface, stdout/stderr contract, and exit codes.

use anyhow::{Context, Result};
use clap::Parser;
use hostcrawl::{
    client::ReqwestHttpClient, config::CrawlConfig, policy::DirsPolicy, policy::RobotsPolicy,
    Crawler,
};
use std::io::Write;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hostcrawl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Breadth-first, same-host web crawler", long_about = None)]
struct CliArgs {
    /// Seed URL to start crawling from.
    url: String,

    /// Maximum recursion depth; -1 for unbounded.
    #[arg(long, default_value_t = 0)]
    depth: i64,

    /// Number of concurrent worker tasks.
    #[arg(long)]
    workers: Option<usize>,

    /// Delay between requests issued by a single worker (e.g. "150ms", "0").
    #[arg(long, default_value = "150ms")]
    delay: String,

    /// Per-request timeout (e.g. "5s"), clamped to [1s, 10min].
    #[arg(long, default_value = "5s")]
    timeout: String,

    /// User-Agent header value.
    #[arg(long)]
    user_agent: Option<String>,

    /// Disable TLS certificate verification.
    #[arg(long)]
    skip_ssl: bool,

    /// Proxy credentials as `user:pass`.
    #[arg(long)]
    proxy_auth: Option<String>,

    /// Robots.txt policy: ignore, crawl, respect.
    #[arg(long, default_value = "ignore")]
    robots: String,

    /// Directory-listing policy: show, hide, only.
    #[arg(long, default_value = "show")]
    dirs: String,

    /// Scan HTML comments for absolute URLs.
    #[arg(long)]
    brute: bool,

    /// Skip HEAD pre-check; decide parsability from the URL extension alone.
    #[arg(long)]
    headless: bool,

    /// Scan inline and external JavaScript for path-like string literals.
    #[arg(long)]
    js: bool,

    /// Scan inline and external CSS for `url(...)` references.
    #[arg(long)]
    css: bool,

    /// Shorthand for `--js --css`.
    #[arg(long)]
    all: bool,

    /// Restrict extraction to these tag names (repeatable or comma-separated).
    #[arg(long, value_delimiter = ',')]
    tag: Vec<String>,

    /// Substrings that exclude a URL from recursion (repeatable).
    #[arg(long = "ignore")]
    ignore_patterns: Vec<String>,

    /// Extra request header, `Name: value`; `@path` loads one per line from a file.
    #[arg(long = "header")]
    headers: Vec<String>,

    /// Extra cookie, `name=value`; `@path` loads one per line from a file.
    #[arg(long = "cookie")]
    cookies: Vec<String>,

    /// Suppress stderr diagnostics.
    #[arg(long)]
    silent: bool,
}

fn parse_duration(s: &str) -> Result<std::time::Duration> {
    parse_duration_str(s).with_context(|| format!("invalid duration `{s}`"))
}

/// Small duration parser covering the forms this CLI accepts: `"0"`, `"150ms"`,
/// `"5s"`, `"10min"`.
fn parse_duration_str(s: &str) -> Result<std::time::Duration, std::num::ParseIntError> {
    let s = s.trim();
    if s == "0" {
        return Ok(std::time::Duration::ZERO);
    }

    let (num, unit) = s
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| s.split_at(i))
        .unwrap_or((s, "s"));

    let n: u64 = num.parse()?;

    Ok(match unit {
        "ms" => std::time::Duration::from_millis(n),
        "s" | "" => std::time::Duration::from_secs(n),
        "min" | "m" => std::time::Duration::from_secs(n * 60),
        _ => std::time::Duration::from_secs(n),
    })
}

fn install_logging(silent: bool) {
    if silent {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .event_format(PrefixFormatter)
        .init();
}

/// Formats events as `[*] message` (info), `[!] message` (warn), `[-] message`
/// (error/other).
struct PrefixFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for PrefixFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let prefix = match *event.metadata().level() {
            tracing::Level::ERROR => "[-]",
            tracing::Level::WARN => "[!]",
            _ => "[*]",
        };
        write!(writer, "{prefix} ")?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn main() {
    let args = CliArgs::parse();
    install_logging(args.silent);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[-] failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    // Silent runs still print a final error directly to stderr.
    if let Err(e) = runtime.block_on(run(args)) {
        eprintln!("[-] {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let headers = hostcrawl::values::load(&args.headers).context("loading --header values")?;
    let cookies = hostcrawl::values::load(&args.cookies).context("loading --cookie values")?;

    let robots_policy = RobotsPolicy::from_str(&args.robots)?;
    let dirs_policy = DirsPolicy::from_str(&args.dirs)?;

    let mut config = CrawlConfig {
        workers: args.workers.unwrap_or_else(|| CrawlConfig::default().workers),
        depth: args.depth,
        delay: parse_duration(&args.delay)?,
        timeout: parse_duration(&args.timeout)?,
        robots_policy,
        dirs_policy,
        brute: args.brute,
        no_head: args.headless,
        scan_js: args.js || args.all,
        scan_css: args.css || args.all,
        tag_filter: args.tag,
        ignore_patterns: args.ignore_patterns,
        extra_headers: headers,
        extra_cookies: cookies,
        user_agent: args
            .user_agent
            .unwrap_or_else(|| CrawlConfig::default().user_agent),
        skip_ssl: args.skip_ssl,
        proxy_auth: args.proxy_auth.clone(),
    };

    if let Some(creds) = args.proxy_auth {
        config = config.with_proxy_auth(creds);
    }

    config.validate();
    tracing::info!("{config}");

    let client = ReqwestHttpClient::new(
        &config.user_agent,
        config.workers,
        config.timeout,
        config.skip_ssl,
        &config.extra_headers,
        &config.extra_cookies,
    )
    .context("building HTTP client")?;

    let crawler = Crawler::new(config, client);

    let stdout = std::io::stdout();
    crawler
        .run(&args.url, move |url| {
            let mut out = stdout.lock();
            let _ = writeln!(out, "{url}");
        })
        .await
        .context("crawl failed")?;

    Ok(())
}
