//! Crawl engine: worker pool, coordinator, emitter wired over three bounded channels.

mod crawler;
mod task;

pub use crawler::Crawler;
pub use task::{Task, TaskFlag};
