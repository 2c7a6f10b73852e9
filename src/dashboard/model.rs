use serde::Serialize;

pub const DEFAULT_TITLE: &str = "Log Analysis Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    LogBrowser,
    TimeSeries,
    Stat,
    Table,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub kind: PanelKind,
    pub title: String,
    /// Selector, `json` stage, then the field clause for non-log panels.
    pub query: String,
    /// Source field names as they appear in the logs.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardDocument {
    pub title: String,
    /// Numeric timestamp field chosen as time axis, if any was selected.
    pub time_field: Option<String>,
    /// Log browser first, table (if any) last.
    pub panels: Vec<Panel>,
}
