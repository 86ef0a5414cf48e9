//! Configuration for filecat.
//!
//! Values are layered with [`figment`], lowest precedence first:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a configuration file: the one given explicitly, or else `filecat.toml`
//!    in the working directory, or else `filecat.toml` in the platform
//!    configuration directory,
//! 3. environment variables prefixed with `FILECAT_` (e.g. `FILECAT_ROOT_PATH`),
//! 4. command-line [`Overrides`].
//!
//! Configuration files may be TOML, YAML or JSON, chosen by file extension.

pub mod error;

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "FILECAT_";
pub const DEFAULT_FILE_NAME: &str = "filecat.toml";
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[display("trace")]
    Trace,
    #[display("debug")]
    Debug,
    #[default]
    #[display("info")]
    Info,
    #[display("warn")]
    Warn,
    #[display("error")]
    Error,
}

/// Fully resolved configuration handed to the catalog pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the catalog walk starts from.
    pub root_path: PathBuf,
    /// Location of the SQLite inventory database.
    pub database_path: PathBuf,
    /// File run logs are appended to.
    pub log_path: PathBuf,
    pub log_level: LogLevel,
    /// Forces [`LogLevel::Debug`] and mirrors logs to stderr.
    pub debug: bool,
    /// Read buffer size used when hashing files.
    pub chunk_size: usize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("data"),
            database_path: PathBuf::from("database/filecat.db"),
            log_path: PathBuf::from("logs/filecat.log"),
            log_level: LogLevel::default(),
            debug: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl Config {
    /// Load, merge and validate configuration from every source.
    ///
    /// `file` is an explicitly requested configuration file; it must exist.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let figment = Self::figment(file)?.merge(Serialized::defaults(overrides));
        Self::from_figment(&figment)
    }

    /// Build the layered [`Figment`] (without command-line overrides).
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        let figment = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Self::merge_file(figment, path)?,
            None => match Self::discover() {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "Using discovered configuration file");
                    Self::merge_file(figment, &path)?
                },
                None => figment,
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract and validate a configuration from an already built figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(DEFAULT_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        ProjectDirs::from("", "", "filecat")
            .map(|dirs| dirs.config_dir().join(DEFAULT_FILE_NAME))
            .filter(|path| path.is_file())
    }

    /// Reject values that would only fail later, half-way through a run.
    ///
    /// Whether `root_path` exists is checked by the catalog itself when the
    /// run starts.
    pub fn validate(&self) -> Result<()> {
        if self.root_path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "root_path", reason: "must not be empty" });
        }
        if self.database_path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "database_path", reason: "must not be empty" });
        }
        if self.database_path.is_dir() {
            exn::bail!(ErrorKind::Invalid { field: "database_path", reason: "is a directory" });
        }
        if self.log_path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "log_path", reason: "must not be empty" });
        }
        if self.log_path.is_dir() {
            exn::bail!(ErrorKind::Invalid { field: "log_path", reason: "is a directory" });
        }
        if self.chunk_size == 0 {
            exn::bail!(ErrorKind::Invalid { field: "chunk_size", reason: "must be greater than zero" });
        }
        Ok(())
    }

    /// The level logs are written at, taking `debug` into account.
    pub fn effective_log_level(&self) -> LogLevel {
        match self.debug {
            true => self.log_level.min(LogLevel::Debug),
            false => self.log_level,
        }
    }
}
