//! Coarse line-format classification for sample diagnostics.

use crate::error::CoreError;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    Json,
    Logfmt,
    Pattern,
    Unstructured,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormatCounts {
    pub json: usize,
    pub logfmt: usize,
    pub pattern: usize,
    pub unstructured: usize,
}

impl FormatCounts {
    pub fn record(&mut self, format: LineFormat) {
        match format {
            LineFormat::Json => self.json += 1,
            LineFormat::Logfmt => self.logfmt += 1,
            LineFormat::Pattern => self.pattern += 1,
            LineFormat::Unstructured => self.unstructured += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.json + self.logfmt + self.pattern + self.unstructured
    }

    /// Most frequent format; ties go to the more structured one.
    pub fn dominant(&self) -> Option<LineFormat> {
        if self.total() == 0 {
            return None;
        }
        let ranked = [
            (self.json, LineFormat::Json),
            (self.logfmt, LineFormat::Logfmt),
            (self.pattern, LineFormat::Pattern),
            (self.unstructured, LineFormat::Unstructured),
        ];
        let mut best = ranked[0];
        for cand in &ranked[1..] {
            if cand.0 > best.0 {
                best = *cand;
            }
        }
        Some(best.1)
    }
}

const TIMESTAMP_PATTERNS: [&str; 3] = [
    // ISO8601
    r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})",
    // Common log format
    r"\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4}",
    // Date and time separated by a space
    r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(,\d+)?",
];

pub struct LineClassifier {
    logfmt_pair: Regex,
    timestamps: Vec<Regex>,
    /// Same shapes anchored at both ends, for whole field values.
    timestamp_values: Vec<Regex>,
    level_token: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self, CoreError> {
        let timestamps = TIMESTAMP_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let timestamp_values = TIMESTAMP_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("^(?:{})$", p)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            logfmt_pair: Regex::new(r#"(\w+)=("[^"]*"|\S+)"#)?,
            timestamps,
            timestamp_values,
            level_token: Regex::new(r"(\[|\||\{)\s*(INFO|DEBUG|WARN|ERROR|TRACE)")?,
        })
    }

    /// Whether a field value is, in its entirety, one of the known timestamp
    /// shapes.
    pub fn is_timestamp_value(&self, value: &str) -> bool {
        let value = value.trim();
        self.timestamp_values.iter().any(|re| re.is_match(value))
    }

    /// `is_json_object` comes from the extractor so each line is parsed once.
    pub fn classify(&self, line: &str, is_json_object: bool) -> LineFormat {
        if is_json_object {
            return LineFormat::Json;
        }
        if self.logfmt_pair.find_iter(line).take(2).count() >= 2 {
            return LineFormat::Logfmt;
        }
        if self.timestamps.iter().any(|re| re.is_match(line)) || self.level_token.is_match(line) {
            return LineFormat::Pattern;
        }
        LineFormat::Unstructured
    }
}
