//! Grafana dashboard JSON for a `DashboardDocument`.
//!
//! Metric panels wrap the stored pipeline in a range aggregation; log and
//! table panels use it as is. Output depends only on the inputs, so the uid
//! is derived from the title instead of being random.

use crate::dashboard::query::label_name;
use crate::dashboard::{DashboardDocument, Panel, PanelKind};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrafanaOptions {
    pub datasource_uid: String,
    pub refresh: String,
    pub time_from: String,
}

impl Default for GrafanaOptions {
    fn default() -> Self {
        Self {
            datasource_uid: "loki".to_string(),
            refresh: "10s".to_string(),
            time_from: "now-1h".to_string(),
        }
    }
}

const FULL_WIDTH: u32 = 24;
const HALF_WIDTH: u32 = 12;

pub fn render_grafana(doc: &DashboardDocument, opts: &GrafanaOptions) -> Value {
    let datasource = json!({ "type": "loki", "uid": opts.datasource_uid });

    let mut panels = Vec::with_capacity(doc.panels.len());
    let mut y = 0u32;
    // Column of the next half-width panel; `None` when the row is free.
    let mut half_row: Option<u32> = None;

    for (i, panel) in doc.panels.iter().enumerate() {
        let id = i as u32 + 1;
        let (w, h) = match panel.kind {
            PanelKind::LogBrowser => (FULL_WIDTH, 10),
            PanelKind::Table => (FULL_WIDTH, 12),
            _ => (HALF_WIDTH, 8),
        };

        let x = if w == FULL_WIDTH {
            if half_row.take().is_some() {
                y += 8;
            }
            0
        } else {
            match half_row.take() {
                Some(x) => x,
                None => {
                    half_row = Some(HALF_WIDTH);
                    0
                }
            }
        };

        let mut out = render_panel(panel, id, &datasource);
        out["gridPos"] = json!({ "h": h, "w": w, "x": x, "y": y });
        panels.push(out);

        if w == FULL_WIDTH || x == HALF_WIDTH {
            y += h;
        }
    }

    let mut dashboard = json!({
        "uid": dashboard_uid(&doc.title),
        "title": doc.title,
        "tags": ["lokidash", "generated"],
        "timezone": "browser",
        "editable": true,
        "liveNow": true,
        "graphTooltip": 0,
        "time": { "from": opts.time_from, "to": "now" },
        "refresh": opts.refresh,
        "schemaVersion": 38,
        "version": 1,
        "panels": panels,
    });
    if let Some(field) = &doc.time_field {
        dashboard["description"] = json!(format!("time axis: {}", field));
    }
    dashboard
}

fn render_panel(panel: &Panel, id: u32, datasource: &Value) -> Value {
    let field = panel.fields.first().map(|f| label_name(f));
    let q = &panel.query;

    let (kind, expr, query_type, legend) = match (panel.kind, &field) {
        (PanelKind::LogBrowser, _) => ("logs", q.clone(), "range", None),
        (PanelKind::Table, _) => ("table", q.clone(), "range", None),
        (PanelKind::TimeSeries, _) => (
            "timeseries",
            format!("avg_over_time({} | __error__=\"\" [$__interval])", q),
            "range",
            None,
        ),
        (PanelKind::Pie, Some(f)) => (
            "piechart",
            format!("sum by ({}) (count_over_time({} [$__range]))", f, q),
            "instant",
            Some(format!("{{{{{}}}}}", f)),
        ),
        (PanelKind::Pie, None) => (
            "piechart",
            format!("sum(count_over_time({} [$__range]))", q),
            "instant",
            None,
        ),
        (PanelKind::Stat, _) => (
            "stat",
            format!("sum(count_over_time({} [$__range]))", q),
            "instant",
            None,
        ),
    };

    let mut target = json!({ "refId": "A", "expr": expr, "queryType": query_type });
    if let Some(legend) = legend {
        target["legendFormat"] = json!(legend);
    }

    let mut out = json!({
        "id": id,
        "title": panel.title,
        "type": kind,
        "datasource": datasource,
        "targets": [target],
    });

    match panel.kind {
        PanelKind::LogBrowser => {
            out["options"] = json!({
                "showLabels": false,
                "showTime": true,
                "sortOrder": "Descending",
                "wrapLogMessage": true,
                "dedupStrategy": "none",
                "enableLogDetails": true,
                "prettifyLogMessage": true,
            });
        }
        PanelKind::Table => {
            out["options"] = json!({
                "footer": { "enablePagination": true, "show": false },
                "showHeader": true,
            });
            out["fieldConfig"] = json!({
                "defaults": { "custom": { "filterable": true, "align": "auto" } },
                "overrides": [],
            });
        }
        PanelKind::Stat => {
            out["options"] = json!({
                "reduceOptions": { "calcs": ["lastNotNull"], "fields": "", "values": false },
                "textMode": "value_and_name",
            });
        }
        PanelKind::Pie => {
            out["options"] = json!({
                "legend": { "displayMode": "table", "placement": "right", "values": ["value"] },
                "reduceOptions": { "calcs": ["lastNotNull"], "fields": "", "values": false },
            });
        }
        PanelKind::TimeSeries => {}
    }

    out
}

/// Lowercase alphanumerics joined by `-`, at most 40 chars (Grafana's limit).
fn dashboard_uid(title: &str) -> String {
    let mut uid = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            uid.push(c.to_ascii_lowercase());
        } else if !uid.is_empty() && !uid.ends_with('-') {
            uid.push('-');
        }
    }
    let uid = uid.trim_end_matches('-');
    let uid: String = uid.chars().take(40).collect();
    if uid.is_empty() {
        "lokidash".to_string()
    } else {
        uid
    }
}

/// File name a dashboard is saved under: `Api Logs` -> `api_logs.json`.
pub fn dashboard_file_name(title: &str) -> String {
    let mut name = title.trim().to_lowercase().replace(' ', "_");
    if name.is_empty() {
        name = "dashboard".to_string();
    }
    if !name.ends_with(".json") {
        name.push_str(".json");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardOptions, synthesize_dashboard};
    use crate::labels::Labels;
    use crate::schema::{LineOutcome, Schema, extract_line};
    use pretty_assertions::assert_eq;

    fn doc() -> DashboardDocument {
        let mut schema = Schema::default();
        for line in [
            r#"{"ts":1,"level":"INFO","latency":5,"service":"api","msg":"x","status":200}"#,
            r#"{"ts":2,"level":"WARN","latency":7,"service":"api","msg":"y","status":"n/a"}"#,
        ] {
            if let LineOutcome::Fields(f) = extract_line(line) {
                schema.observe_all(f);
            }
        }
        synthesize_dashboard(
            &schema,
            &["ts", "level", "latency", "service", "status"],
            "API Logs",
            "api",
            &Labels::new(),
            &DashboardOptions::default(),
        )
    }

    #[test]
    fn renders_panel_types_and_metric_queries() {
        let out = render_grafana(&doc(), &GrafanaOptions::default());
        let panels = out["panels"].as_array().unwrap();

        let types: Vec<&str> = panels.iter().map(|p| p["type"].as_str().unwrap()).collect();
        assert_eq!(types, vec!["logs", "piechart", "timeseries", "stat", "table"]);

        assert_eq!(
            panels[1]["targets"][0]["expr"],
            r#"sum by (level) (count_over_time({job="api"} | json | level != "" [$__range]))"#
        );
        assert_eq!(panels[1]["targets"][0]["legendFormat"], "{{level}}");
        assert_eq!(
            panels[2]["targets"][0]["expr"],
            r#"avg_over_time({job="api"} | json | unwrap latency | __error__="" [$__interval])"#
        );
        assert_eq!(out["uid"], "api-logs");
        assert_eq!(out["description"], "time axis: ts");
        assert_eq!(out["panels"][0]["datasource"]["uid"], "loki");
    }

    #[test]
    fn grid_places_half_panels_in_pairs() {
        let out = render_grafana(&doc(), &GrafanaOptions::default());
        let pos: Vec<(u64, u64, u64)> = out["panels"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| {
                let g = &p["gridPos"];
                (
                    g["x"].as_u64().unwrap(),
                    g["y"].as_u64().unwrap(),
                    g["w"].as_u64().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            pos,
            vec![(0, 0, 24), (0, 10, 12), (12, 10, 12), (0, 18, 12), (0, 26, 24)]
        );
    }

    #[test]
    fn rendering_is_stable() {
        let a = serde_json::to_string(&render_grafana(&doc(), &GrafanaOptions::default())).unwrap();
        let b = serde_json::to_string(&render_grafana(&doc(), &GrafanaOptions::default())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn uid_and_file_names() {
        assert_eq!(dashboard_uid("  My App / Prod  "), "my-app-prod");
        assert_eq!(dashboard_uid("!!!"), "lokidash");
        assert_eq!(dashboard_uid(&"x".repeat(60)).len(), 40);
        assert_eq!(dashboard_file_name("Api Logs"), "api_logs.json");
        assert_eq!(dashboard_file_name("x.json"), "x.json");
    }
}
