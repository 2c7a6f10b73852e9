//! Panel selection heuristics.

use crate::dashboard::model::DEFAULT_TITLE;
use crate::dashboard::{DashboardDocument, Panel, PanelKind, QueryBuilder};
use crate::labels::Labels;
use crate::schema::{FieldObservation, Schema};
use std::collections::HashSet;
use tracing::{debug, warn};

pub const DEFAULT_CARDINALITY_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// String fields with fewer distinct values than this become pie/stat.
    pub cardinality_threshold: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            cardinality_threshold: DEFAULT_CARDINALITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    TimeAxis,
    Series,
    Stat,
    Pie,
    Column,
}

fn role_of(field: &FieldObservation, opts: &DashboardOptions) -> Role {
    if field.is_numeric() {
        if is_timestamp_name(&field.name) {
            Role::TimeAxis
        } else {
            Role::Series
        }
    } else if field.is_timestamp_string() {
        Role::TimeAxis
    } else if field.is_string()
        && !field.cardinality_saturated
        && field.cardinality < opts.cardinality_threshold
    {
        if field.cardinality <= 1 {
            Role::Stat
        } else {
            Role::Pie
        }
    } else {
        Role::Column
    }
}

/// Build the panel list for `selected` fields of `schema`.
///
/// Panels follow selection order: the log browser first, one panel per
/// numeric or low-cardinality string field, and one shared table for the
/// rest. The first timestamp field is the time axis; later ones are table
/// columns. Names missing from the schema and repeated names are skipped.
pub fn synthesize_dashboard<S: AsRef<str>>(
    schema: &Schema,
    selected: &[S],
    title: &str,
    job: &str,
    labels: &Labels,
    opts: &DashboardOptions,
) -> DashboardDocument {
    let query = QueryBuilder::new(job, labels);
    let title = match title.trim() {
        "" => DEFAULT_TITLE.to_string(),
        t => t.to_string(),
    };

    let mut panels = vec![Panel {
        kind: PanelKind::LogBrowser,
        title: "Log Browser".to_string(),
        query: query.logs(),
        fields: Vec::new(),
    }];
    let mut time_field: Option<String> = None;
    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for name in selected {
        let name = name.as_ref();
        if !seen.insert(name) {
            continue;
        }
        let Some(field) = schema.get(name) else {
            warn!("selected field '{}' was not found in the sampled logs", name);
            continue;
        };

        let kind = match role_of(field, opts) {
            Role::TimeAxis => {
                if time_field.is_none() {
                    time_field = Some(field.name.clone());
                } else {
                    debug!("time axis already set, '{}' goes to the table", name);
                    columns.push(field.name.clone());
                }
                continue;
            }
            Role::Column => {
                columns.push(field.name.clone());
                continue;
            }
            Role::Series => PanelKind::TimeSeries,
            Role::Stat => PanelKind::Stat,
            Role::Pie => PanelKind::Pie,
        };

        let fields = vec![field.name.clone()];
        panels.push(Panel {
            kind,
            title: panel_title(kind, &field.name),
            query: query.fields(kind, &fields),
            fields,
        });
    }

    if !columns.is_empty() {
        panels.push(Panel {
            kind: PanelKind::Table,
            title: "Structured Fields".to_string(),
            query: query.fields(PanelKind::Table, &columns),
            fields: columns,
        });
    }

    DashboardDocument {
        title,
        time_field,
        panels,
    }
}

fn panel_title(kind: PanelKind, field: &str) -> String {
    let name = humanize(field);
    match kind {
        PanelKind::TimeSeries => format!("{} Over Time", name),
        PanelKind::Pie => format!("{} Distribution", name),
        _ => name,
    }
}

/// Whether a field name reads like a point in time (`ts`, `@timestamp`,
/// `created_at`, `createdAt`, ...). Durations such as `response_time` do not.
pub fn is_timestamp_name(name: &str) -> bool {
    let n = name.trim_start_matches('@').to_ascii_lowercase();
    const EXACT: &[&str] = &["ts", "time", "timestamp", "date", "datetime", "epoch"];
    const SUFFIXES: &[&str] = &["_at", "_ts", "_timestamp", "-ts", ".ts", "_epoch"];
    if EXACT.contains(&n.as_str()) || SUFFIXES.iter().any(|s| n.ends_with(s)) {
        return true;
    }
    // camelCase, e.g. createdAt / eventTs / logTimestamp
    name.ends_with("At") || name.ends_with("Ts") || name.ends_with("Timestamp")
}

/// `response_time_ms` -> `Response Time Ms`, `statusCode` -> `Status Code`.
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !cur.is_empty() {
                words.push(std::mem::take(&mut cur));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !cur.is_empty() {
            words.push(std::mem::take(&mut cur));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        cur.push(c);
    }
    if !cur.is_empty() {
        words.push(cur);
    }

    if words.is_empty() {
        return name.to_string();
    }
    words
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
