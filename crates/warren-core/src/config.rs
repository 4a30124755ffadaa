//! Client configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use warren_types::Result;

use crate::selector::START_URI;

/// Runtime configuration, loadable from a TOML file. Every field has a
/// default, so a missing or empty file works out of the box.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address opened when none is given on the command line.
    pub start_url: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Idle-read deadline in seconds.
    pub read_timeout_secs: u64,
    /// Directory for "open externally" downloads. Defaults to a
    /// session-scoped temporary directory when unset.
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_url: START_URI.to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 10,
            download_dir: None,
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Config> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}
