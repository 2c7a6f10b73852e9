//! LogQL pipeline strings for panels.
//!
//! Shape: `{job="<job>", k="v"} | json` plus one field clause:
//! - time series: `| unwrap <field>`
//! - pie / stat:  `| <field> != ""`
//! - table:       `| line_format "a={{.a}} b={{.b}}"`

use crate::dashboard::PanelKind;
use crate::labels::Labels;

pub struct QueryBuilder {
    selector: String,
}

impl QueryBuilder {
    pub fn new(job: &str, labels: &Labels) -> Self {
        let mut matchers = Vec::with_capacity(labels.len() + 1);
        if !job.is_empty() {
            matchers.push(format!("job=\"{}\"", escape_value(job)));
        }
        for (k, v) in labels.iter() {
            matchers.push(format!("{}=\"{}\"", k, escape_value(v)));
        }
        // Loki needs at least one matcher that cannot match the empty string.
        if matchers.is_empty() {
            matchers.push("job=~\".+\"".to_string());
        }
        Self {
            selector: format!("{{{}}}", matchers.join(", ")),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn logs(&self) -> String {
        format!("{} | json", self.selector)
    }

    /// Query for a non-log panel over `fields` (one field except for tables).
    pub fn fields(&self, kind: PanelKind, fields: &[String]) -> String {
        let base = self.logs();
        match kind {
            PanelKind::LogBrowser => base,
            PanelKind::TimeSeries => match fields.first() {
                Some(f) => format!("{} | unwrap {}", base, label_name(f)),
                None => base,
            },
            PanelKind::Pie | PanelKind::Stat => match fields.first() {
                Some(f) => format!("{} | {} != \"\"", base, label_name(f)),
                None => base,
            },
            PanelKind::Table => {
                if fields.is_empty() {
                    return base;
                }
                let columns: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let l = label_name(f);
                        format!("{}={{{{.{}}}}}", l, l)
                    })
                    .collect();
                format!("{} | line_format \"{}\"", base, columns.join(" "))
            }
        }
    }
}

/// Label name Loki's `json` stage produces for a top-level key: characters
/// outside `[A-Za-z0-9_]` become `_`, and a leading digit gets a `_` prefix.
pub fn label_name(field: &str) -> String {
    let mut out: String = field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn escape_value(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"")
}
