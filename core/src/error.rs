use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("global actions coordinator is no longer running")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the global actions home directory")]
    NoHome,
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
