//! Result-queue payload.

/// Why a discovered URL is being reported to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFlag {
    /// Emit-only; never re-queued for crawling.
    Default,
    /// Re-queue onto `crawl-queue` if it passes scope/robots/ignore checks.
    Crawl,
    /// Sentinel: one in-flight URL has finished processing.
    Done,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub url: String,
    pub fingerprint: u64,
    pub flag: TaskFlag,
}

impl Task {
    pub fn new(url: String, fingerprint: u64, flag: TaskFlag) -> Self {
        Self {
            url,
            fingerprint,
            flag,
        }
    }

    pub fn done() -> Self {
        Self {
            url: String::new(),
            fingerprint: 0,
            flag: TaskFlag::Done,
        }
    }
}
