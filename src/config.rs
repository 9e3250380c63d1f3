use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use sdesk_pm::{
    DEFAULT_DBPATH, DEFAULT_DIRECTIVES, DEFAULT_LOCK_FILE, DEFAULT_PACMAN, DEFAULT_TIMEOUT_SECS,
};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/sdesk/update.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub general: Option<GeneralConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "GeneralConfig::default_lock_file")]
    pub lock_file: PathBuf,
    #[serde(default = "GeneralConfig::default_directives")]
    pub directives: PathBuf,
    #[serde(default = "GeneralConfig::default_dbpath")]
    pub dbpath: PathBuf,
    #[serde(default = "GeneralConfig::default_pacman")]
    pub pacman: String,
    #[serde(default = "GeneralConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "GeneralConfig::default_strict")]
    pub strict: bool,
}

impl GeneralConfig {
    pub fn default_lock_file() -> PathBuf {
        PathBuf::from(DEFAULT_LOCK_FILE)
    }

    pub fn default_directives() -> PathBuf {
        PathBuf::from(DEFAULT_DIRECTIVES)
    }

    pub fn default_dbpath() -> PathBuf {
        PathBuf::from(DEFAULT_DBPATH)
    }

    pub fn default_pacman() -> String {
        String::from(DEFAULT_PACMAN)
    }

    pub const fn default_timeout_secs() -> u64 {
        DEFAULT_TIMEOUT_SECS
    }

    pub const fn default_strict() -> bool {
        false
    }
}

impl Config {
    /// Read the config at `path`, or the default location when `path` is `None`.
    ///
    /// Only the default location may be absent.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        let s = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                debug!("{} does not exist, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()))
            }
        };

        Self::from_toml(&s)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.general
            .as_ref()
            .map(|x| x.lock_file.clone())
            .unwrap_or_else(GeneralConfig::default_lock_file)
    }

    pub fn directives(&self) -> PathBuf {
        self.general
            .as_ref()
            .map(|x| x.directives.clone())
            .unwrap_or_else(GeneralConfig::default_directives)
    }

    pub fn dbpath(&self) -> PathBuf {
        self.general
            .as_ref()
            .map(|x| x.dbpath.clone())
            .unwrap_or_else(GeneralConfig::default_dbpath)
    }

    pub fn pacman(&self) -> String {
        self.general
            .as_ref()
            .map(|x| x.pacman.clone())
            .unwrap_or_else(GeneralConfig::default_pacman)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.general
            .as_ref()
            .map(|x| x.timeout_secs)
            .unwrap_or_else(GeneralConfig::default_timeout_secs)
    }

    pub fn strict(&self) -> bool {
        self.general
            .as_ref()
            .map(|x| x.strict)
            .unwrap_or_else(GeneralConfig::default_strict)
    }
}
