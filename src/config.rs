//! Binder configuration.
//!
//! A [`Config`] carries the three knobs of a bind: how column names map to
//! field keys, whether the binder closes the cursor itself, and where errors
//! from that close go. Pass one to [`Binder::new`](crate::Binder::new), or
//! install a process-wide default once at startup for the free functions
//! [`row`](crate::row) and [`rows`](crate::rows).
//!
//! The serializable part lives in [`Settings`], read from the `[scan]` table
//! of `qail.toml`:
//!
//! ```toml
//! [scan]
//! naming = "title"    # or "exact"
//! auto_close = true
//! ```

use crate::error::ConfigError;
use crate::naming::to_title_case;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Column name -> candidate field key.
pub type Mapper = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Receives errors from cursors closed by the binder.
pub type CloseNotifier = Arc<dyn Fn(&(dyn Error + 'static)) + Send + Sync>;

/// Built-in column naming conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// `first_name` -> `FirstName`.
    #[default]
    Title,
    /// The column name must already equal the field key.
    Exact,
}

impl Naming {
    pub fn apply(self, column: &str) -> String {
        match self {
            Naming::Title => to_title_case(column),
            Naming::Exact => column.to_string(),
        }
    }
}

/// Serializable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub naming: Naming,
    pub auto_close: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            naming: Naming::Title,
            auto_close: true,
        }
    }
}

impl Settings {
    /// Parse settings from TOML, either a `[scan]` table or top-level keys.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let settings: Settings = match table.get("scan") {
            Some(scan) => scan.clone().try_into()?,
            None => toml::Value::Table(table).try_into()?,
        };
        Ok(settings)
    }

    /// Read settings from a file such as `qail.toml`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Configuration for a [`Binder`](crate::Binder).
#[derive(Clone)]
pub struct Config {
    mapper: Mapper,
    auto_close: bool,
    on_close_error: CloseNotifier,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(Settings::default())
    }
}

impl From<Settings> for Config {
    fn from(settings: Settings) -> Self {
        let naming = settings.naming;
        Self {
            mapper: Arc::new(move |column: &str| naming.apply(column)),
            auto_close: settings.auto_close,
            on_close_error: Arc::new(|_: &(dyn Error + 'static)| {}),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom column name mapper.
    pub fn with_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.mapper = Arc::new(mapper);
        self
    }

    pub fn with_naming(self, naming: Naming) -> Self {
        self.with_mapper(move |column: &str| naming.apply(column))
    }

    /// When enabled (the default) the binder closes the cursor after every
    /// bind. When disabled the caller owns closing it.
    pub fn auto_close(mut self, enabled: bool) -> Self {
        self.auto_close = enabled;
        self
    }

    /// Handle errors returned by an automatic close. The default drops them.
    pub fn on_close_error<F>(mut self, notify: F) -> Self
    where
        F: Fn(&(dyn Error + 'static)) + Send + Sync + 'static,
    {
        self.on_close_error = Arc::new(notify);
        self
    }

    pub fn map_column(&self, column: &str) -> String {
        (self.mapper)(column)
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn is_auto_close(&self) -> bool {
        self.auto_close
    }

    pub(crate) fn notify_close_error(&self, err: &(dyn Error + 'static)) {
        (self.on_close_error)(err)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("auto_close", &self.auto_close)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Process-wide default
// ============================================================================

static GLOBAL: OnceLock<Config> = OnceLock::new();

/// Install the process-wide default configuration.
///
/// Call once during startup, before the first bind. Fails if a configuration
/// was already installed or the default was already used.
pub fn install(config: Config) -> Result<(), ConfigError> {
    GLOBAL.set(config).map_err(|_| ConfigError::AlreadyInstalled)
}

/// The process-wide configuration; the default when none was installed.
pub fn global() -> &'static Config {
    GLOBAL.get_or_init(Config::default)
}
