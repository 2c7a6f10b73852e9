//! Dashboard synthesis: schema + operator selection in, panel list out.
//!
//! `model` is renderer-agnostic; `render` turns it into Grafana JSON.

pub mod model;
pub mod query;
pub mod render;
pub mod synth;

pub use model::{DashboardDocument, Panel, PanelKind};
pub use query::QueryBuilder;
pub use render::{GrafanaOptions, dashboard_file_name, render_grafana};
pub use synth::{DashboardOptions, synthesize_dashboard};
