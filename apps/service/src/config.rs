use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitoring::checker::DEFAULT_USER_AGENT;

/// Overrides `database.path` when set
pub const DATABASE_ENV: &str = "UPTRACK_DATABASE";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read config {}: {}", .0.display(), .1)]
    ReadFailed(path::PathBuf, #[source] std::io::Error),
    #[error("Failed to write config {}: {}", .0.display(), .1)]
    WriteFailed(path::PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("No config directory available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub checker: CheckerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: path::PathBuf,
    pub max_connections: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between scheduler wakes; must stay below one minute
    pub wake_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "uptrack.db".into(), max_connections: 16 }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { wake_seconds: 30 }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self { timeout_seconds: 10, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/uptrack/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("uptrack/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path.display())?;
        write_1(f, "Max Connections", &self.database.max_connections)?;
        write_title_1(f, "Scheduler")?;
        write_1(f, "Wake Period (s)", &self.scheduler.wake_seconds)?;
        write_title_1(f, "Checker")?;
        write_1(f, "Timeout (s)", &self.checker.timeout_seconds)?;
        write_1(f, "User Agent", &self.checker.user_agent)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/uptrack/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let mut config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|err| Error::ReadFailed(config_path.clone(), err))?;
            toml::from_str(raw_string.as_str())?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    fn apply_env(&mut self) {
        if let Ok(path) = env::var(DATABASE_ENV) {
            if !path.is_empty() {
                self.database.path = path.into();
            }
        }
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), Error> {
        if self.scheduler.wake_seconds == 0 || self.scheduler.wake_seconds >= 60 {
            return Err(Error::Invalid(format!(
                "scheduler.wake_seconds must be between 1 and 59, got {}",
                self.scheduler.wake_seconds
            )));
        }
        if self.checker.timeout_seconds == 0 {
            return Err(Error::Invalid("checker.timeout_seconds must be positive".into()));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Invalid("database.max_connections must be positive".into()));
        }
        Ok(())
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::WriteFailed(parent.to_path_buf(), err))?;
        }

        std::fs::write(path, config_str).map_err(|err| Error::WriteFailed(path.to_path_buf(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let config = Config::from_config(Some(&path)).unwrap();

        assert!(path.exists());
        assert_eq!(config.scheduler.wake_seconds, 30);
        assert_eq!(config.checker.timeout_seconds, 10);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[checker]\ntimeout_seconds = 3\n").unwrap();

        let config = Config::from_config(Some(&path)).unwrap();

        assert_eq!(config.checker.timeout_seconds, 3);
        assert_eq!(config.checker.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn test_extension_is_normalized() {
        assert_eq!(normalize_toml_path(path::Path::new("conf")), path::PathBuf::from("conf.toml"));
        assert_eq!(normalize_toml_path(path::Path::new("a.toml")), path::PathBuf::from("a.toml"));
    }

    #[test]
    fn test_wake_period_must_stay_under_a_minute() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.scheduler.wake_seconds = 60;
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));

        config.scheduler.wake_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_lists_sections() {
        let rendered = Config::default().to_string();
        assert!(rendered.contains("Scheduler"));
        assert!(rendered.contains("Wake Period (s): 30"));
    }
}
