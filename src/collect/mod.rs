//! Promtail-style collection config: one scrape job per log source.

pub mod merge;
pub mod model;

pub use merge::merge_job;
pub use model::{CollectionConfigDocument, JobSpec, ScrapeJob, StaticConfig};
