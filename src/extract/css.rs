//! CSS `url(...)` extractor, used for both external stylesheets and
//! inline `<style>` bodies when `scan_css` is enabled.

use crate::url_util::normalize;
use cssparser::{Parser, ParserInput, Token};
use url::Url;

/// Scan `bytes` (a stylesheet body) for `url(...)` tokens — both the dedicated
/// `UnquotedUrl` token and a `Function("url")` wrapping a quoted string argument —
/// resolving each against `base`.
pub fn extract_css(bytes: &[u8], base: &Url, mut sink: impl FnMut(String)) {
    let text = String::from_utf8_lossy(bytes);
    let mut input = ParserInput::new(&text);
    let mut parser = Parser::new(&mut input);

    loop {
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        match token {
            Token::UrlToken(raw) => emit(base, &raw, &mut sink),
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                let _ = parser.parse_nested_block(|inner| -> Result<(), cssparser::ParseError<'_, ()>> {
                    if let Ok(Token::QuotedString(raw)) = inner.next() {
                        emit(base, raw, &mut sink);
                    }
                    Ok(())
                });
            }
            _ => {}
        }
    }
}

fn emit(base: &Url, raw: &str, sink: &mut impl FnMut(String)) {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return;
    }
    if let Some(url) = normalize(base, raw) {
        sink(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/css/").unwrap()
    }

    #[test]
    fn extracts_unquoted_url_token() {
        let mut found = Vec::new();
        extract_css(b"body { background: url(bg.png); }", &base(), |u| found.push(u));
        assert_eq!(found, vec!["https://example.com/css/bg.png".to_string()]);
    }

    #[test]
    fn extracts_quoted_url_function() {
        let mut found = Vec::new();
        extract_css(
            br#".a { background: url("images/a.jpg"); }"#,
            &base(),
            |u| found.push(u),
        );
        assert_eq!(found, vec!["https://example.com/css/images/a.jpg".to_string()]);
    }

    #[test]
    fn extracts_multiple_imports() {
        let mut found = Vec::new();
        extract_css(
            b"@import url(reset.css); @import url('theme.css');",
            &base(),
            |u| found.push(u),
        );
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn skips_data_uris() {
        let mut found = Vec::new();
        extract_css(
            b"body { background: url(data:image/png;base64,AAAA); }",
            &base(),
            |u| found.push(u),
        );
        assert!(found.is_empty());
    }
}
