//! Configuration file support.
//!
//! `painel.toml` selects the dataset source and the dashboard settings.
//! Every field has a default, so a missing file or section is not an error;
//! environment variables override whatever the file says.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::models::SchoolCalendar;
use crate::parsing::parse_date_strict;

pub const CONFIG_FILE_NAME: &str = "painel.toml";
pub const DEFAULT_STATE_NAME: &str = "Espírito Santo";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PainelConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub local: LocalSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_state_name")]
    pub state_name: String,
    /// Holidays as `yyyy-mm-dd` or `dd/mm/yyyy`.
    #[serde(default)]
    pub holidays: Vec<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            state_name: default_state_name(),
            holidays: Vec::new(),
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_state_name() -> String {
    DEFAULT_STATE_NAME.to_string()
}

impl PainelConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// First existing `painel.toml` among:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn default_location() -> Option<PathBuf> {
        [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    pub fn from_default_location() -> Result<Self, RepositoryError> {
        match Self::default_location() {
            Some(path) => {
                log::info!("Using configuration file {}", path.display());
                Self::from_file(&path)
            }
            None => Err(RepositoryError::configuration(format!(
                "No {} found in standard locations",
                CONFIG_FILE_NAME
            ))),
        }
    }

    /// Default-location file when present, built-in defaults otherwise, then
    /// environment overrides. A file that exists but fails to parse is an
    /// error.
    pub fn load() -> Result<Self, RepositoryError> {
        let mut config = if Self::default_location().is_some() {
            Self::from_default_location()?
        } else {
            log::info!("No {} found; using defaults", CONFIG_FILE_NAME);
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `REPOSITORY_TYPE`, `DATA_DIR`, `DATA_BASE_URL` and `STATE_NAME`
    /// from `lookup`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(value) = get("REPOSITORY_TYPE") {
            self.repository.repo_type = value;
        }
        if let Some(value) = get("DATA_DIR") {
            self.local.data_dir = PathBuf::from(value);
        }
        if let Some(value) = get("DATA_BASE_URL") {
            self.http.base_url = value;
        }
        if let Some(value) = get("STATE_NAME") {
            self.dashboard.state_name = value;
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        RepositoryType::from_str(&self.repository.repo_type)
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))
    }

    /// Calendar built from `dashboard.holidays`. Any malformed date fails.
    pub fn calendar(&self) -> Result<SchoolCalendar, RepositoryError> {
        let holidays = self
            .dashboard
            .holidays
            .iter()
            .map(|h| parse_date_strict(h))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SchoolCalendar::new(holidays))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = PainelConfig::from_toml("").unwrap();
        assert_eq!(config, PainelConfig::default());
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert_eq!(config.local.data_dir, PathBuf::from("data"));
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.dashboard.state_name, "Espírito Santo");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[repository]
type = "http"

[http]
base_url = "https://dados.example.org/painel"
timeout_secs = 10

[dashboard]
state_name = "ES"
holidays = ["2025-04-18", "21/04/2025"]
"#;
        let config = PainelConfig::from_toml(toml).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Http);
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        let calendar = config.calendar().unwrap();
        assert!(!calendar.is_school_day(NaiveDate::from_ymd_opt(2025, 4, 18).unwrap()));
        assert!(!calendar.is_school_day(NaiveDate::from_ymd_opt(2025, 4, 21).unwrap()));
        assert!(calendar.is_school_day(NaiveDate::from_ymd_opt(2025, 4, 22).unwrap()));
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        let config = PainelConfig::from_toml("[repository]\ntype = \"ftp\"\n").unwrap();
        assert!(matches!(
            config.repository_type(),
            Err(RepositoryError::ConfigurationError { .. })
        ));

        let config = PainelConfig::from_toml("[dashboard]\nholidays = [\"amanhã\"]\n").unwrap();
        assert!(config.calendar().is_err());

        assert!(PainelConfig::from_toml("[repository\n").is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = PainelConfig::default();
        let env: HashMap<&str, &str> = [
            ("REPOSITORY_TYPE", "memory"),
            ("DATA_DIR", "/srv/painel"),
            ("STATE_NAME", " "),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Memory);
        assert_eq!(config.local.data_dir, PathBuf::from("/srv/painel"));
        // blank override ignored
        assert_eq!(config.dashboard.state_name, DEFAULT_STATE_NAME);
    }
}
