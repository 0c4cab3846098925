use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable naming the database file.
pub const DB_PATH_ENV: &str = "BIRTHDAY_DB_PATH";
/// Database file used when nothing else names one.
pub const DEFAULT_DB_FILE_NAME: &str = "birthdays.sqlite3";

/// Top-level birthday CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BirthdayConfig {
    /// SQLite database file.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Default window for `upcoming`.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Log level used when no `-v` flag is given.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Default for `due --notify-once-per-day`.
    #[serde(default)]
    pub notify_once_per_day: bool,
}

impl Default for BirthdayConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            window_days: default_window_days(),
            log_level: None,
            log_dir: None,
            notify_once_per_day: false,
        }
    }
}

fn default_window_days() -> u32 {
    30
}

/// Configuration load failure.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl BirthdayConfig {
    /// Loads `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Database path: `cli_db`, then config, then `BIRTHDAY_DB_PATH`, then
    /// `birthdays.sqlite3` in the working directory.
    pub fn resolve_db_path(&self, cli_db: Option<&Path>) -> PathBuf {
        let env_db = std::env::var(DB_PATH_ENV).ok();
        self.resolve_db_path_with(cli_db, env_db.as_deref())
    }

    fn resolve_db_path_with(&self, cli_db: Option<&Path>, env_db: Option<&str>) -> PathBuf {
        if let Some(path) = cli_db {
            return path.to_path_buf();
        }
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        match env_db.map(str::trim) {
            Some(raw) if !raw.is_empty() => PathBuf::from(raw),
            _ => PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}
