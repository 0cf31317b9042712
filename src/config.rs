use anyhow::{bail, Result};

use crate::naming::YearPrefix;

/// Runtime settings, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Year tokens offered as presets (`ATCH_YEAR_TOKENS`, comma-separated)
    pub year_tokens: Vec<String>,
    /// Prefix applied when a session starts (`ATCH_YEAR`)
    pub default_year: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            year_tokens: ["2022", "2023", "2024", "2025"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_year: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            year_tokens: lookup("ATCH_YEAR_TOKENS")
                .map(|v| {
                    v.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|tokens| !tokens.is_empty())
                .unwrap_or(default.year_tokens),
            default_year: lookup("ATCH_YEAR")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or(default.default_year),
        }
    }

    /// Resolve a preset year token.
    pub fn preset(&self, token: &str) -> Result<YearPrefix> {
        if !self.year_tokens.iter().any(|t| t == token) {
            bail!(
                "Unknown year {:?} (presets: {}); use --custom-year for other values",
                token,
                self.year_tokens.join(", ")
            );
        }
        Ok(YearPrefix::Preset(token.to_string()))
    }

    /// The prefix a new session starts with.
    pub fn initial_prefix(&self) -> YearPrefix {
        match &self.default_year {
            Some(year) if self.year_tokens.contains(year) => YearPrefix::Preset(year.clone()),
            Some(year) => YearPrefix::Custom(year.clone()),
            None => YearPrefix::None,
        }
    }

    /// Combine the `--year` / `--custom-year` flags with the configured default.
    pub fn resolve_prefix(&self, year: Option<&str>, custom_year: Option<&str>) -> Result<YearPrefix> {
        match (year, custom_year) {
            (Some(_), Some(_)) => bail!("--year and --custom-year cannot be combined"),
            (Some(token), None) => self.preset(token),
            (None, Some(value)) => Ok(YearPrefix::Custom(value.to_string())),
            (None, None) => Ok(self.initial_prefix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.year_tokens, vec!["2022", "2023", "2024", "2025"]);
        assert_eq!(config.initial_prefix(), YearPrefix::None);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ATCH_YEAR_TOKENS", "2025, 2026,"),
            ("ATCH_YEAR", "2026"),
        ]));
        assert_eq!(config.year_tokens, vec!["2025", "2026"]);
        assert_eq!(config.initial_prefix(), YearPrefix::Preset("2026".into()));
    }

    #[test]
    fn test_custom_default_year() {
        let config = Config::from_lookup(lookup(&[("ATCH_YEAR", "FY24")]));
        assert_eq!(config.initial_prefix(), YearPrefix::Custom("FY24".into()));
    }

    #[test]
    fn test_resolve_prefix() {
        let config = Config::default();
        assert_eq!(
            config.resolve_prefix(Some("2023"), None).unwrap(),
            YearPrefix::Preset("2023".into())
        );
        assert!(config.resolve_prefix(Some("1999"), None).is_err());
        assert_eq!(
            config.resolve_prefix(None, Some("1999")).unwrap(),
            YearPrefix::Custom("1999".into())
        );
        assert!(config.resolve_prefix(Some("2023"), Some("1999")).is_err());
        assert_eq!(config.resolve_prefix(None, None).unwrap(), YearPrefix::None);
    }
}
