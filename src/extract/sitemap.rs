//! Sitemap XML extractor: `<urlset>/<url>/<loc>` entries and
//! `<sitemapindex>/<sitemap>/<loc>` nested sitemap references, both surfaced through
//! the same `sink` — callers distinguish sitemap-vs-page by re-checking
//! [`crate::url_util::is_sitemap`] on the emitted URL.

use crate::url_util::normalize;
use url::Url;
use xml::reader::{EventReader, XmlEvent};

/// Parse a sitemap document, calling `sink(url)` for every `<loc>` text body found
/// inside a `<url>` or `<sitemap>` entry. Malformed XML yields whatever was parsed
/// before the error — sitemap feeds in the wild are frequently imperfect.
pub fn extract_sitemap(bytes: &[u8], base: &Url, mut sink: impl FnMut(String)) {
    let reader = EventReader::new(bytes);
    let mut in_loc = false;

    for event in reader {
        match event {
            Ok(XmlEvent::StartElement { name, .. }) => {
                if name.local_name.eq_ignore_ascii_case("loc") {
                    in_loc = true;
                }
            }
            Ok(XmlEvent::EndElement { name }) => {
                if name.local_name.eq_ignore_ascii_case("loc") {
                    in_loc = false;
                }
            }
            Ok(XmlEvent::Characters(text)) | Ok(XmlEvent::CData(text)) => {
                if in_loc {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        if let Some(url) = normalize(base, trimmed) {
                            sink(url);
                        }
                    }
                }
            }
            Err(_) => break,
            _ => {}
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
    fn extracts_urlset_locations() {
        let xml = br#"<?xml version="1.0"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/a</loc></url>
  <url><loc>https://example.com/b</loc></url>
</urlset>"#;
        let mut found = Vec::new();
        extract_sitemap(xml, &base(), |u| found.push(u));
        assert_eq!(
            found,
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string()
            ]
        );
    }

    #[test]
    fn extracts_sitemap_index_locations() {
        let xml = br#"<sitemapindex>
  <sitemap><loc>https://example.com/sitemap-1.xml</loc></sitemap>
  <sitemap><loc>https://example.com/sitemap-2.xml</loc></sitemap>
</sitemapindex>"#;
        let mut found = Vec::new();
        extract_sitemap(xml, &base(), |u| found.push(u));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn ignores_text_outside_loc() {
        let xml = br#"<urlset><url><loc>https://example.com/a</loc><priority>0.5</priority></url></urlset>"#;
        let mut found = Vec::new();
        extract_sitemap(xml, &base(), |u| found.push(u));
        assert_eq!(found, vec!["https://example.com/a".to_string()]);
    }

    #[test]
    fn relative_loc_resolves_against_base() {
        let xml = br#"<urlset><url><loc>/relative/page</loc></url></urlset>"#;
        let mut found = Vec::new();
        extract_sitemap(xml, &base(), |u| found.push(u));
        assert_eq!(found, vec!["https://example.com/relative/page".to_string()]);
    }
}
