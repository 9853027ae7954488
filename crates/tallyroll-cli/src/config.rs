//! `tallyroll.toml` configuration
//!
//! Every key is optional. Command-line flags override file values.
//!
//! ```toml
//! [report]
//! title = "Monthly Attendance Report"
//! organization = "Acme Construction"
//!
//! [calendar]
//! weekend = ["Sat", "Sun"]
//!
//! [export]
//! output_dir = "exports"
//! strict = false
//! ```

use anyhow::{Context, Result};
use chrono::Weekday;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tallyroll_core::schema::DEFAULT_WEEKEND;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub report: ReportSection,
    pub calendar: CalendarSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub title: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarSection {
    /// Weekday names, e.g. `["Fri"]` or `["Saturday", "Sunday"]`
    pub weekend: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    pub output_dir: Option<PathBuf>,
    pub strict: Option<bool>,
}

impl Config {
    /// Load from `path`, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Configured weekend days, or Saturday and Sunday
    pub fn weekend(&self) -> Result<Vec<Weekday>> {
        match &self.calendar.weekend {
            None => Ok(DEFAULT_WEEKEND.to_vec()),
            Some(names) => names
                .iter()
                .map(|name| {
                    name.trim()
                        .parse::<Weekday>()
                        .map_err(|_| anyhow::anyhow!("invalid weekday in calendar.weekend: {name:?}"))
                })
                .collect(),
        }
    }

    /// `--out-dir`, then `export.output_dir`, then the working directory
    pub fn output_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.export.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// `--strict` turns strict mode on regardless of the file
    pub fn strict(&self, flag: bool) -> bool {
        flag || self.export.strict.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.weekend().unwrap(), vec![Weekday::Sat, Weekday::Sun]);
        assert_eq!(config.output_dir(None), PathBuf::from("."));
        assert!(!config.strict(false));
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(
            r#"
            [report]
            title = "Site Attendance"
            organization = "Acme Construction"

            [calendar]
            weekend = ["Fri", "saturday"]

            [export]
            output_dir = "exports"
            strict = true
            "#,
        )
        .unwrap();

        assert_eq!(config.report.title.as_deref(), Some("Site Attendance"));
        assert_eq!(config.report.organization.as_deref(), Some("Acme Construction"));
        assert_eq!(config.weekend().unwrap(), vec![Weekday::Fri, Weekday::Sat]);
        assert_eq!(config.output_dir(None), PathBuf::from("exports"));
        assert!(config.strict(false));
    }

    #[test]
    fn flags_override_file() {
        let config = Config::from_toml("[export]\noutput_dir = \"exports\"\nstrict = false\n").unwrap();
        assert_eq!(config.output_dir(Some("out".into())), PathBuf::from("out"));
        assert!(config.strict(true));
    }

    #[test]
    fn bad_weekday_is_an_error() {
        let config = Config::from_toml("[calendar]\nweekend = [\"Caturday\"]\n").unwrap();
        let err = config.weekend().unwrap_err();
        assert!(err.to_string().contains("Caturday"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("[report]\ntitel = \"typo\"\n").is_err());
    }
}
