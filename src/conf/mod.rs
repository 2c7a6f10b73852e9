//! Conf module: settings model and loading (file, then environment).

pub mod load;
pub mod model;

pub use model::{DashboardSettings, SampleSettings, SchemaSettings, Settings};
