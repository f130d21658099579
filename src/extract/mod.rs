//! Content extractors: byte stream + base URL + flags → `(kind, url)` events
//! delivered through a synchronous sink. No extractor performs I/O of its own.

pub mod css;
pub mod html;
pub mod js;
pub mod sitemap;

/// Tag for the element class a discovery originated from. `Static` carries the
/// originating element name only for diagnostics; it has no behavioral effect beyond
/// "emit, do not follow".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryKind {
    Anchor,
    Iframe,
    Script,
    Static(&'static str),
}

impl DiscoveryKind {
    /// `true` for kinds that re-queue the URL for crawling, subject to the caller's
    /// scan-js flag for `Script`.
    pub fn is_crawlable(self, scan_js: bool) -> bool {
        match self {
            DiscoveryKind::Anchor | DiscoveryKind::Iframe => true,
            DiscoveryKind::Script => scan_js,
            DiscoveryKind::Static(_) => false,
        }
    }
}

/// Whitelist of allowed tag names; an empty filter allows everything.
pub fn tag_allowed(filter: &[String], tag_name: &str) -> bool {
    filter.is_empty() || filter.iter().any(|t| t.eq_ignore_ascii_case(tag_name))
}
