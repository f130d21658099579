//! JavaScript string-literal heuristic extractor. Not a JS parser: scans
//! single- and double-quoted string literals and keeps the ones that look path-like,
//! a regex-based heuristic rather than a full AST walk.

use crate::url_util::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// Captures the body of a '...' or "..." string literal. Deliberately simple: no
// escape-sequence handling.
static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'([^'\n]+)'|"([^"\n]+)""#).unwrap());

/// A literal is worth emitting when it looks like a path or URL: contains a `/` and
/// doesn't look like a bare word, a template fragment, or a mime/content-type string.
fn looks_path_like(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > 2048 {
        return false;
    }
    if candidate.contains(char::is_whitespace) {
        return false;
    }
    // Protocol-relative URLs ("//cdn.example.com/lib.js") pass this check too.
    candidate.contains('/')
}

/// Scan `bytes` (the text of a `<script>` element or a standalone `.js` body) for
/// string literals that resolve to same-origin-or-external URLs, calling `sink(url)`
/// for each.
pub fn extract_js(bytes: &[u8], base: &Url, mut sink: impl FnMut(String)) {
    let text = String::from_utf8_lossy(bytes);

    for caps in STRING_LITERAL.captures_iter(&text) {
        let candidate = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");

        if !looks_path_like(candidate) {
            continue;
        }

        if let Some(url) = normalize(base, candidate) {
            sink(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn extracts_double_quoted_path() {
        let mut found = Vec::new();
        extract_js(br#"fetch("/api/v1/users");"#, &base(), |u| found.push(u));
        assert_eq!(found, vec!["https://example.com/api/v1/users".to_string()]);
    }

    #[test]
    fn extracts_single_quoted_absolute_url() {
        let mut found = Vec::new();
        extract_js(
            b"var x = 'https://other.host/page';",
            &base(),
            |u| found.push(u),
        );
        assert_eq!(found, vec!["https://other.host/page".to_string()]);
    }

    #[test]
    fn ignores_bare_words_without_slash() {
        let mut found = Vec::new();
        extract_js(br#"var greeting = "hello";"#, &base(), |u| found.push(u));
        assert!(found.is_empty());
    }

    #[test]
    fn ignores_literals_containing_whitespace() {
        let mut found = Vec::new();
        extract_js(br#"var msg = "not a / real path";"#, &base(), |u| found.push(u));
        assert!(found.is_empty());
    }

    #[test]
    fn extracts_protocol_relative_url() {
        let mut found = Vec::new();
        extract_js(br#"var cdn = "//cdn.example.com/lib.js";"#, &base(), |u| {
            found.push(u)
        });
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("cdn.example.com"));
    }

    #[test]
    fn extracts_multiple_literals() {
        let mut found = Vec::new();
        extract_js(
            br#"const a = "/one"; const b = '/two';"#,
            &base(),
            |u| found.push(u),
        );
        assert_eq!(found.len(), 2);
    }
}
