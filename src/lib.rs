//! Log schema inference and dashboard / collection-config synthesis.
//!
//! The three entry points are pure over their inputs:
//! - [`schema::sample_and_infer_schema`] reads a bounded sample of a log directory
//! - [`dashboard::synthesize_dashboard`] maps selected fields to panels
//! - [`collect::merge_job`] writes one job into a collection config

pub mod collect;
pub mod conf;
pub mod dashboard;
pub mod error;
pub mod labels;
pub mod sample;
pub mod schema;

pub type Result<T> = anyhow::Result<T>;

pub use collect::{CollectionConfigDocument, JobSpec, merge_job};
pub use dashboard::{DashboardDocument, synthesize_dashboard};
pub use error::CoreError;
pub use labels::Labels;
pub use schema::{Diagnostics, Schema, sample_and_infer_schema};
