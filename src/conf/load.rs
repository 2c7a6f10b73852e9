//! Load: settings from a TOML file, then environment overrides.

use crate::Result;
use crate::conf::Settings;
use anyhow::{Context, bail};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "LOKIDASH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "lokidash.toml";

impl Settings {
    /// Priority: environment variables > config file > defaults.
    ///
    /// `explicit` wins over `LOKIDASH_CONFIG`; an explicit path must exist,
    /// the default one may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = std::env::var(CONFIG_ENV)
                    .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
                let path = Path::new(&path);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    debug!("no config file at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("loading configuration from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let settings: Settings = toml::from_str(&text)
            .with_context(|| format!("parse config file {}", path.display()))?;
        Ok(settings)
    }

    /// Apply `LOKIDASH_*` overrides looked up through `get`.
    pub fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("LOKIDASH_MAX_FILES") {
            self.sample.max_files = v
                .parse()
                .with_context(|| format!("LOKIDASH_MAX_FILES is not a number: {:?}", v))?;
        }
        if let Some(v) = get("LOKIDASH_MAX_LINES") {
            self.sample.max_lines = v
                .parse()
                .with_context(|| format!("LOKIDASH_MAX_LINES is not a number: {:?}", v))?;
        }
        if let Some(v) = get("LOKIDASH_DATASOURCE_UID") {
            self.dashboard.datasource_uid = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample.max_files == 0 {
            bail!("sample.max_files must be > 0");
        }
        if self.sample.max_lines == 0 {
            bail!("sample.max_lines must be > 0");
        }
        if self.sample.max_line_bytes == 0 {
            bail!("sample.max_line_bytes must be > 0");
        }
        if self.sample.extensions.is_empty() {
            bail!("sample.extensions must not be empty");
        }
        if self.schema.example_cap == 0 {
            bail!("schema.example_cap must be > 0");
        }
        if self.schema.distinct_limit == 0 {
            bail!("schema.distinct_limit must be > 0");
        }
        if self.dashboard.datasource_uid.trim().is_empty() {
            bail!("dashboard.datasource_uid must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lokidash.toml");
        let text = concat!(
            "[sample]\nmax_lines = 250\nextensions = [\".LOG\"]\n",
            "\n[dashboard]\ncardinality_threshold = 4\n",
        );
        fs::write(&path, text).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.sample.max_lines, 250);
        assert_eq!(settings.sample.max_files, 5);
        assert_eq!(settings.sample_limits().extensions, vec!["log".to_string()]);
        assert_eq!(settings.dashboard_options().cardinality_threshold, 4);
        assert_eq!(settings.schema.example_cap, 5);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("LOKIDASH_MAX_FILES", "9"),
            ("LOKIDASH_DATASOURCE_UID", "prod-loki"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.sample.max_files, 9);
        assert_eq!(settings.sample.max_lines, 100);
        assert_eq!(settings.grafana_options().datasource_uid, "prod-loki");
    }

    #[test]
    fn bad_env_number_is_reported() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(|k| (k == "LOKIDASH_MAX_LINES").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("LOKIDASH_MAX_LINES"));
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());
        settings.sample.max_files = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.sample.extensions.clear();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.sample.max_line_bytes = 0;
        assert!(settings.validate().is_err());
    }
}
