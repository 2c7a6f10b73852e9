//! Model: Settings and its sections.

use crate::dashboard::synth::DEFAULT_CARDINALITY_THRESHOLD;
use crate::dashboard::{DashboardOptions, GrafanaOptions};
use crate::sample::SampleLimits;
use crate::sample::sampler::{
    DEFAULT_EXTENSIONS, DEFAULT_MAX_FILES, DEFAULT_MAX_LINE_BYTES, DEFAULT_MAX_LINES,
};
use crate::schema::SchemaOptions;
use crate::schema::aggregate::{DEFAULT_DISTINCT_LIMIT, DEFAULT_EXAMPLE_CAP};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample: SampleSettings,
    pub schema: SchemaSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSettings {
    pub max_files: usize,
    pub max_lines: usize,
    pub max_line_bytes: usize,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    pub example_cap: usize,
    pub distinct_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub cardinality_threshold: usize,
    pub datasource_uid: String,
    pub refresh: String,
    pub time_from: String,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_lines: DEFAULT_MAX_LINES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            example_cap: DEFAULT_EXAMPLE_CAP,
            distinct_limit: DEFAULT_DISTINCT_LIMIT,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        let grafana = GrafanaOptions::default();
        Self {
            cardinality_threshold: DEFAULT_CARDINALITY_THRESHOLD,
            datasource_uid: grafana.datasource_uid,
            refresh: grafana.refresh,
            time_from: grafana.time_from,
        }
    }
}

impl Settings {
    pub fn sample_limits(&self) -> SampleLimits {
        SampleLimits {
            max_files: self.sample.max_files,
            max_lines: self.sample.max_lines,
            max_line_bytes: self.sample.max_line_bytes,
            extensions: self
                .sample
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            example_cap: self.schema.example_cap,
            distinct_limit: self.schema.distinct_limit,
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            cardinality_threshold: self.dashboard.cardinality_threshold,
        }
    }

    pub fn grafana_options(&self) -> GrafanaOptions {
        GrafanaOptions {
            datasource_uid: self.dashboard.datasource_uid.clone(),
            refresh: self.dashboard.refresh.clone(),
            time_from: self.dashboard.time_from.clone(),
        }
    }
}
