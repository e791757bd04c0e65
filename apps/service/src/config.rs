use std::{env, fmt, fs, io, path, time::Duration};

use portwatch::{DestinationConfig, EndpointConfig, SchedulerSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: path::PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: path::PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", .path.display())]
    ParseFailed { path: path::PathBuf, source: toml::de::Error },

    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("no config path available, set XDG_CONFIG_HOME or HOME or pass --config")]
    ConfigPathUnavailable,

    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_check_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    30
}

fn default_startup_delay() -> u64 {
    5
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,

    /// Per-probe connection timeout
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_startup_delay")]
    pub startup_delay_seconds: u64,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,

    /// Single-destination section kept for older config files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gotify: Option<LegacyGotify>,
}

/// Legacy `[gotify]` section; always monitors every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyGotify {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub application_token: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl From<&LegacyGotify> for DestinationConfig {
    fn from(legacy: &LegacyGotify) -> Self {
        DestinationConfig {
            name: None,
            base_url: legacy.base_url.clone(),
            token: legacy.application_token.clone(),
            priority: legacy.priority,
            enabled: legacy.enabled,
            monitor_all: true,
            monitored_endpoints: Vec::new(),
        }
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

/// Get default config path ($XDG_CONFIG_HOME/portwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Some(config_home) = env::var_os("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::var_os("HOME") {
        path::PathBuf::from(home_dir).join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("portwatch/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval(),
            timeout_seconds: default_timeout(),
            startup_delay_seconds: default_startup_delay(),
            endpoints: Vec::new(),
            destinations: Vec::new(),
            gotify: None,
        }
    }
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
        let write_title_2 = write_title_indented(2);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Monitoring Configuration:")?;
        write_1(f, "Check Interval (s)", &self.check_interval_seconds)?;
        write_1(f, "Timeout (s)", &self.timeout_seconds)?;
        write_1(f, "Startup Delay (s)", &self.startup_delay_seconds)?;

        write_title_1(f, "Endpoints")?;
        for endpoint in &self.endpoints {
            write_title_2(f, &endpoint.name)?;
            write_2(f, "Address", &endpoint.key())?;
            write_2(f, "Enabled", &endpoint.enabled)?;
        }

        write_title_1(f, "Destinations")?;
        for destination in self.destinations() {
            write_title_2(f, destination.display_name())?;
            write_2(f, "Base URL", &destination.base_url)?;
            write_2(f, "Enabled", &destination.enabled)?;
            if destination.monitor_all {
                write_2(f, "Endpoints", &"all")?;
            } else {
                write_2(f, "Endpoints", &destination.monitored_endpoints.join(", "))?;
            }
        }

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/portwatch/config.toml
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

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| Error::ReadFailed { path: config_path.clone(), source })?;
            toml::from_str(raw_string.as_str())
                .map_err(|source| Error::ParseFailed { path: config_path, source })
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| Error::WriteFailed { path: parent.to_path_buf(), source })?;
        }

        fs::write(path, config_str).map_err(|source| Error::WriteFailed { path: path.to_path_buf(), source })
    }

    /// All destinations as one list; a configured legacy `[gotify]` section comes first
    pub fn destinations(&self) -> Vec<DestinationConfig> {
        let legacy = self
            .gotify
            .as_ref()
            .filter(|gotify| !gotify.base_url.trim().is_empty())
            .map(DestinationConfig::from);

        legacy.into_iter().chain(self.destinations.iter().cloned()).collect()
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            check_interval: Duration::from_secs(self.check_interval_seconds),
            probe_timeout: Duration::from_secs(self.timeout_seconds),
            startup_delay: Duration::from_secs(self.startup_delay_seconds),
        }
    }

    /// Reject configurations the monitor cannot run with
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |e: anyhow::Error| Error::Invalid(e.to_string());

        validation::validate_check_interval(self.check_interval_seconds).map_err(invalid)?;
        validation::validate_timeout(self.timeout_seconds).map_err(invalid)?;
        validation::validate_endpoints(&self.endpoints).map_err(invalid)?;
        for destination in self.destinations() {
            validation::validate_destination(&destination).map_err(invalid)?;
        }

        Ok(())
    }

    /// Suspicious but accepted settings, one message each
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.endpoints.iter().any(|e| e.enabled) {
            warnings.push("No enabled endpoints configured, nothing will be monitored".to_string());
        }

        let destinations = self.destinations();
        if destinations.iter().all(|d| !d.enabled) {
            warnings.push("No enabled destinations configured, alerts will only be logged".to_string());
        }

        for (destination, entry) in validation::unmatched_allow_list_entries(&self.endpoints, &destinations) {
            warnings.push(format!(
                "Destination {destination} lists endpoint '{entry}' which is not configured"
            ));
        }

        warnings
    }
}
