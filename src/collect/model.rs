use crate::error::CoreError;
use crate::labels::Labels;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

pub const SCRAPE_CONFIGS: &str = "scrape_configs";
pub const JOB_LABEL: &str = "job";
pub const PATH_LABEL: &str = "__path__";
pub const DEFAULT_TARGET: &str = "localhost";
/// Labels the job itself writes; user labels may not use them.
pub const RESERVED_LABELS: &[&str] = &[JOB_LABEL, PATH_LABEL];

/// A job the operator wants collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    /// Glob of files to tail, stored under `__path__`.
    pub path_pattern: String,
    pub labels: Labels,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, path_pattern: impl Into<String>, labels: Labels) -> Self {
        Self {
            name: name.into(),
            path_pattern: path_pattern.into(),
            labels,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::EmptyJobName);
        }
        if self.path_pattern.trim().is_empty() {
            return Err(CoreError::EmptyPathPattern(self.name.clone()));
        }
        self.labels.validate(RESERVED_LABELS)
    }

    /// The scrape entry as written to the document.
    pub fn to_scrape_job(&self) -> ScrapeJob {
        let mut labels = Labels::new();
        labels.insert(JOB_LABEL, self.name.as_str());
        for (k, v) in self.labels.iter() {
            labels.insert(k, v);
        }
        labels.insert(PATH_LABEL, self.path_pattern.as_str());

        ScrapeJob {
            job_name: self.name.clone(),
            static_configs: vec![StaticConfig {
                targets: vec![DEFAULT_TARGET.to_string()],
                labels,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeJob {
    pub job_name: String,
    pub static_configs: Vec<StaticConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticConfig {
    pub targets: Vec<String>,
    pub labels: Labels,
}

/// The whole collection config. Only `scrape_configs` is interpreted; every
/// other key is carried through untouched and in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfigDocument {
    root: Mapping,
}

impl Default for CollectionConfigDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl CollectionConfigDocument {
    pub fn empty() -> Self {
        Self {
            root: Mapping::new(),
        }
    }

    /// Parse YAML text. An empty or `null` document is an empty config.
    pub fn from_yaml_str(text: &str) -> Result<Self, CoreError> {
        let value: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(text)?
        };
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let root = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(m) => m,
            _ => {
                return Err(CoreError::InvalidDocument(
                    "top level must be a mapping".to_string(),
                ));
            }
        };
        let doc = Self { root };
        doc.scrape_configs()?;
        Ok(doc)
    }

    pub fn to_yaml_string(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(&self.root)?)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    pub(crate) fn into_mapping(self) -> Mapping {
        self.root
    }

    pub(crate) fn from_mapping_unchecked(root: Mapping) -> Self {
        Self { root }
    }

    /// Scrape entries; a missing or null key means none.
    pub fn scrape_configs(&self) -> Result<&[Value], CoreError> {
        match self.root.get(SCRAPE_CONFIGS) {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Sequence(seq)) => Ok(seq.as_slice()),
            Some(_) => Err(CoreError::InvalidDocument(format!(
                "{} must be a list",
                SCRAPE_CONFIGS
            ))),
        }
    }

    /// Job names in document order. Entries without a name are skipped.
    pub fn job_names(&self) -> Vec<String> {
        self.scrape_configs()
            .unwrap_or_default()
            .iter()
            .filter_map(entry_job_name)
            .map(str::to_string)
            .collect()
    }

    pub fn contains_job(&self, name: &str) -> bool {
        self.job_names().iter().any(|n| n == name)
    }

    /// `__path__` values of every static config of job `name`.
    pub fn job_paths(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        for entry in self.scrape_configs().unwrap_or_default() {
            if entry_job_name(entry) != Some(name) {
                continue;
            }
            let Some(Value::Sequence(statics)) = entry.get("static_configs") else {
                continue;
            };
            for sc in statics {
                if let Some(path) = sc
                    .get("labels")
                    .and_then(|l| l.get(PATH_LABEL))
                    .and_then(Value::as_str)
                {
                    out.push(path.to_string());
                }
            }
        }
        out
    }
}

pub(crate) fn entry_job_name(entry: &Value) -> Option<&str> {
    entry.get("job_name").and_then(Value::as_str)
}
