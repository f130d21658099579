//! Robots policy store: parses `robots.txt` into a query surface of
//! `forbidden(path)`, harvested `links()` and `sitemaps()`.

use std::collections::HashSet;
use std::io::BufRead;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessMode {
    AllowAll,
    Rules,
    DenyAll,
}

/// Parsed `robots.txt`, or one of the two degenerate constants used when the fetch
/// itself is skipped or fails.
#[derive(Debug, Clone)]
pub struct RobotsTxt {
    mode: AccessMode,
    deny: HashSet<String>,
    links: HashSet<String>,
    sitemaps: HashSet<String>,
}

impl RobotsTxt {
    pub fn allow_all() -> Self {
        Self {
            mode: AccessMode::AllowAll,
            deny: HashSet::new(),
            links: HashSet::new(),
            sitemaps: HashSet::new(),
        }
    }

    pub fn deny_all() -> Self {
        Self {
            mode: AccessMode::DenyAll,
            ..Self::allow_all()
        }
    }

    /// Parse the body of a `robots.txt` document for the given user-agent string.
    /// Never fails: unrecognized lines are simply skipped.
    pub fn from_reader<R: BufRead>(user_agent: &str, reader: R) -> std::io::Result<Self> {
        let mut txt = Self {
            mode: AccessMode::Rules,
            deny: HashSet::new(),
            links: HashSet::new(),
            sitemaps: HashSet::new(),
        };

        let mut active = false;

        for line in reader.lines() {
            let line = line?;
            let Some((key, value)) = extract_token(&line) else {
                continue;
            };

            match key {
                TokenKind::UserAgent => {
                    active = value == "*" || user_agent.contains(value.as_str());
                }
                TokenKind::Disallow => {
                    if active {
                        txt.deny.insert(value.clone());
                    }
                    txt.links.insert(value);
                }
                TokenKind::Allow => {
                    txt.links.insert(value);
                }
                TokenKind::Sitemap => {
                    txt.sitemaps.insert(value);
                }
            }
        }

        Ok(txt)
    }

    pub fn forbidden(&self, path: &str) -> bool {
        match self.mode {
            AccessMode::AllowAll => false,
            AccessMode::DenyAll => true,
            AccessMode::Rules => self.deny.contains(path),
        }
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }

    pub fn sitemaps(&self) -> impl Iterator<Item = &str> {
        self.sitemaps.iter().map(String::as_str)
    }
}

enum TokenKind {
    UserAgent,
    Allow,
    Disallow,
    Sitemap,
}

fn extract_token(line: &str) -> Option<(TokenKind, String)> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let sep = line.find(':')?;
    let key = line[..sep].trim();
    let value = line[sep + 1..].trim();

    if value.is_empty() {
        return None;
    }

    let key_lower = key.to_lowercase();
    let kind = match key_lower.as_str() {
        "useragent" | "user-agent" => TokenKind::UserAgent,
        "allow" => TokenKind::Allow,
        "disallow" => TokenKind::Disallow,
        "sitemap" | "site-map" => TokenKind::Sitemap,
        _ => return None,
    };

    Some((kind, value.to_string()))
}

/// `{seed.scheme, seed.host, /robots.txt}`.
pub fn robots_url(seed: &Url) -> String {
    format!(
        "{}://{}/robots.txt",
        seed.scheme(),
        seed.host_str().unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(ua: &str, body: &str) -> RobotsTxt {
        RobotsTxt::from_reader(ua, Cursor::new(body.as_bytes())).unwrap()
    }

    #[test]
    fn allow_all_never_forbids() {
        assert!(!RobotsTxt::allow_all().forbidden("/anything"));
    }

    #[test]
    fn deny_all_forbids_everything() {
        assert!(RobotsTxt::deny_all().forbidden("/anything"));
    }

    #[test]
    fn scoped_disallow_applies_only_to_matching_agent() {
        let body = "User-agent: a\nDisallow: /a\nDisallow: /c\nUser-agent: b\nDisallow: /b\n";

        let for_a = parse("a", body);
        assert!(for_a.forbidden("/a"));
        assert!(for_a.forbidden("/c"));
        assert!(!for_a.forbidden("/b"));

        let for_b = parse("b", body);
        assert!(for_b.forbidden("/b"));
        assert!(!for_b.forbidden("/a"));
    }

    #[test]
    fn wildcard_agent_applies_to_everyone() {
        let body = "User-agent: *\nDisallow: /private\n";
        let txt = parse("whatever-ua", body);
        assert!(txt.forbidden("/private"));
    }

    #[test]
    fn links_collect_every_allow_and_disallow_regardless_of_agent() {
        let body = "User-agent: other\nDisallow: /x\nAllow: /y\n";
        let txt = parse("mine", body);
        let links: HashSet<_> = txt.links().collect();
        assert!(links.contains("/x"));
        assert!(links.contains("/y"));
        assert!(!txt.forbidden("/x"));
    }

    #[test]
    fn sitemaps_are_harvested() {
        let body = "Sitemap: http://other.host/sitemap.xml\n";
        let txt = parse("ua", body);
        assert!(txt.sitemaps().any(|s| s == "http://other.host/sitemap.xml"));
    }

    #[test]
    fn inline_comments_are_stripped() {
        let body = "User-agent: * # comment\nDisallow: /a # also a comment\n";
        let txt = parse("ua", body);
        assert!(txt.forbidden("/a"));
    }

    #[test]
    fn blank_and_unknown_lines_are_ignored() {
        let body = "\n# just a comment\nFoo: bar\nDisallow:\nUser-agent: *\nDisallow: /x\n";
        let txt = parse("ua", body);
        assert!(txt.forbidden("/x"));
        assert_eq!(txt.links().count(), 1);
    }

    #[test]
    fn robots_url_is_scheme_host_path() {
        let seed = Url::parse("https://example.com/deep/path").unwrap();
        assert_eq!(robots_url(&seed), "https://example.com/robots.txt");
    }
}
