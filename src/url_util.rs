//! URL normalizer & classifier.

use url::Url;

const JS_SCHEME: &str = "javascript";

const PARSABLE_EXTENSIONS: &[&str] = &[
    "asp", "aspx", "cgi", "htm", "html", "jsp", "php", "pl", "xhtml", "xml", "js", "css",
];

/// Resolve `raw` against `base`, strip fragment, default empty path to `/`, reject
/// `javascript:` targets. Returns `None` when the result has no host.
pub fn normalize(base: &Url, raw: &str) -> Option<String> {
    let mut parsed = match Url::parse(raw) {
        Ok(u) => u,
        Err(_) => base.join(raw).ok()?,
    };

    if parsed.host_str().is_none() {
        parsed = base.join(raw).ok()?;
    }

    if parsed.host_str().is_none() {
        return None;
    }

    if parsed.scheme().eq_ignore_ascii_case(JS_SCHEME) {
        return None;
    }

    if parsed.scheme().is_empty() {
        let _ = parsed.set_scheme(base.scheme());
    }

    if parsed.path().is_empty() {
        parsed.set_path("/");
    }

    parsed.set_fragment(None);

    Some(parsed.to_string())
}

/// FNV-1a 64-bit hash over the case-folded URL string, used as the seen-set key.
pub fn fingerprint(url: &str) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET;
    for byte in url.to_lowercase().bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn clean_path(p: &str) -> String {
    let p = if p.is_empty() { "/" } else { p };
    let segments: Vec<&str> = p.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Segment-wise relative depth of `sub` under `base`, or `None` if `sub` does not sit
/// under `base` at all.
fn relative_depth(base: &str, sub: &str) -> Option<usize> {
    let bp = clean_path(base);
    let sp = clean_path(sub);

    if sp.len() < bp.len() {
        return None;
    }

    if !sp.starts_with(&bp) {
        return None;
    }

    let rest = &sp[bp.len()..];
    let n = rest.split('/').filter(|s| !s.is_empty()).count();

    Some(n)
}

/// Host equality (case-sensitive on the normalized host) plus depth-bounded path
/// containment under `base`. `depth < 0` disables the depth check.
pub fn in_scope(base: &Url, candidate: &Url, depth: i64) -> bool {
    if base.host_str() != candidate.host_str() {
        return false;
    }

    match relative_depth(base.path(), candidate.path()) {
        Some(d) => depth < 0 || (d as i64) <= depth,
        None => false,
    }
}

/// `true` iff the final path segment (before any query string) contains a `.`.
pub fn is_resource(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or("");
    let last = last.split('?').next().unwrap_or(last);
    last.contains('.')
}

/// Suffix match on `sitemap.xml` / `sitemap-index.xml`.
pub fn is_sitemap(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.ends_with("sitemap.xml") || lower.ends_with("sitemap-index.xml")
}

/// `true` when a resource has no extension, or a parse-without-HEAD-safe extension.
pub fn can_parse_without_head(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or("");
    match last.rsplit_once('.') {
        None => true,
        Some((_, ext)) => PARSABLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
    }
}

fn media_type(content_type: Option<&str>) -> Option<String> {
    content_type.map(|ct| {
        ct.split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase()
    })
}

pub fn is_html(content_type: Option<&str>) -> bool {
    media_type(content_type).as_deref() == Some("text/html")
}

pub fn is_js(content_type: Option<&str>, url: &str) -> bool {
    match media_type(content_type).as_deref() {
        Some(mt) if mt.contains("javascript") || mt == "application/ecmascript" => true,
        _ => url.to_lowercase().ends_with(".js"),
    }
}

pub fn is_css(content_type: Option<&str>, url: &str) -> bool {
    match media_type(content_type).as_deref() {
        Some("text/css") => true,
        _ => url.to_lowercase().ends_with(".css"),
    }
}
