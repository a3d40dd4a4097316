//! # configs
//!
//! Layered settings for bump-board hosts.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional)
//! 4. an explicit file passed by the host (optional)
//! 5. `BUMP_BOARD__*` environment variables, `__` separating sections
//!    (e.g. `BUMP_BOARD__LOG__FORMAT=json`)
//!
//! `.env` is loaded into the process environment before step 5.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const ENV_PREFIX: &str = "BUMP_BOARD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostSettings {
    /// Upper bound the host applies to `count` on array reads.
    pub max_page: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log: LogSettings,
    pub host: HostSettings,
}

impl Settings {
    /// Loads `.env`, the default files, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Same as [`Settings::load`], with one extra file layered above the defaults.
    pub fn load_with(extra: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }

        let mut builder = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));
        if let Some(path) = extra {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()
    }

    /// Defaults overlaid with an inline TOML document. No files, no environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.host.max_page == 0 {
            return Err(ConfigError::Invalid("host.max_page must be at least 1".into()));
        }
        Ok(self)
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("log.level", "info")?
        .set_default("log.format", "pretty")?
        .set_default("host.max_page", 50)?)
}
