//! Robots and directory-listing policies.

use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the engine treats `robots.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotsPolicy {
    /// Never fetch robots.txt; everything is allowed.
    Ignore,
    /// Fetch robots.txt, harvest its links/sitemaps, but ignore `Disallow`.
    Crawl,
    /// Fetch robots.txt and enforce `Disallow` against the crawl queue.
    Respect,
}

impl Default for RobotsPolicy {
    fn default() -> Self {
        RobotsPolicy::Ignore
    }
}

impl fmt::Display for RobotsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RobotsPolicy::Ignore => "ignore",
            RobotsPolicy::Crawl => "crawl",
            RobotsPolicy::Respect => "respect",
        };
        f.write_str(s)
    }
}

impl FromStr for RobotsPolicy {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(RobotsPolicy::Ignore),
            "crawl" => Ok(RobotsPolicy::Crawl),
            "respect" => Ok(RobotsPolicy::Respect),
            other => Err(CrawlError::PolicyUnknown {
                field: "robots-policy",
                value: other.to_string(),
            }),
        }
    }
}

/// How non-resource (directory-like) URLs are treated on emission and recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirsPolicy {
    /// Emit everything.
    Show,
    /// Emit resources only (suppress directory-like URLs).
    Hide,
    /// Emit directory-like URLs only; also blocks resources from recursion.
    Only,
}

impl Default for DirsPolicy {
    fn default() -> Self {
        DirsPolicy::Show
    }
}

impl fmt::Display for DirsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DirsPolicy::Show => "show",
            DirsPolicy::Hide => "hide",
            DirsPolicy::Only => "only",
        };
        f.write_str(s)
    }
}

impl FromStr for DirsPolicy {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "show" => Ok(DirsPolicy::Show),
            "hide" => Ok(DirsPolicy::Hide),
            "only" => Ok(DirsPolicy::Only),
            other => Err(CrawlError::PolicyUnknown {
                field: "dirs-policy",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_robots_policies() {
        assert_eq!("ignore".parse::<RobotsPolicy>().unwrap(), RobotsPolicy::Ignore);
        assert_eq!("Crawl".parse::<RobotsPolicy>().unwrap(), RobotsPolicy::Crawl);
        assert_eq!("RESPECT".parse::<RobotsPolicy>().unwrap(), RobotsPolicy::Respect);
    }

    #[test]
    fn rejects_unknown_robots_policy() {
        assert!("what".parse::<RobotsPolicy>().is_err());
    }

    #[test]
    fn parses_known_dirs_policies() {
        assert_eq!("show".parse::<DirsPolicy>().unwrap(), DirsPolicy::Show);
        assert_eq!("hide".parse::<DirsPolicy>().unwrap(), DirsPolicy::Hide);
        assert_eq!("only".parse::<DirsPolicy>().unwrap(), DirsPolicy::Only);
    }

    #[test]
    fn rejects_unknown_dirs_policy() {
        assert!("nope".parse::<DirsPolicy>().is_err());
    }
}
