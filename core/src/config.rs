use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::theme::ThemeSettings;

const CONFIG_TOML_FILE: &str = "config.toml";
const GLOBAL_ACTIONS_HOME_ENV: &str = "GLOBAL_ACTIONS_HOME";
const DEFAULT_CHANNEL_CAPACITY: usize = 128;
const DEFAULT_LOG_FILTER: &str = "info";

/// What to do with a show request that arrives while a session is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Take the new keyguard/provisioning snapshots and run the show logic
    /// again.
    #[default]
    Resnapshot,
    /// Drop the request and keep the current session untouched.
    Ignore,
}

/// Raw contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigToml {
    pub reentry: Option<ReentryPolicy>,
    pub channel_capacity: Option<usize>,
    pub log_filter: Option<String>,
    pub theme: Option<ThemeSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub reentry: ReentryPolicy,
    /// Size of the bounded channels used by hosts.
    pub channel_capacity: usize,
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
    pub theme: ThemeSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(ConfigToml::default())
    }
}

impl From<ConfigToml> for Config {
    fn from(toml: ConfigToml) -> Self {
        Self {
            reentry: toml.reentry.unwrap_or_default(),
            channel_capacity: toml
                .channel_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY),
            log_filter: toml
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            theme: toml.theme.unwrap_or_default(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the global actions home directory.
    pub fn load() -> Result<Self, ConfigError> {
        let home = find_global_actions_home().map_err(|_| ConfigError::NoHome)?;
        Self::load_from_path(&home.join(CONFIG_TOML_FILE))
    }

    /// Loads the given file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!("{} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let parsed = toml::from_str::<ConfigToml>(&contents).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::from(parsed))
    }
}

/// Returns the directory holding `config.toml`.
///
/// `$GLOBAL_ACTIONS_HOME` wins when set and non-empty, otherwise
/// `~/.global-actions` is used. The directory does not have to exist.
pub fn find_global_actions_home() -> io::Result<PathBuf> {
    if let Some(home) = std::env::var_os(GLOBAL_ACTIONS_HOME_ENV)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let mut home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
    })?;
    home.push(".global-actions");
    Ok(home)
}
