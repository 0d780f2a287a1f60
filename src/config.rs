//! Configuration Module
//!
//! Defaults for walk options, stored in `~/.config/depwalk/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Explicit CLI flags
//! 2. Environment variables (`DEPWALK_PARALLEL_LIMIT`)
//! 3. Config file (`~/.config/depwalk/config.toml`)
//! 4. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::runtime::{Direction, WalkOptions};

/// Environment variable overriding `defaults.max_concurrency`
pub const PARALLEL_LIMIT_ENV: &str = "DEPWALK_PARALLEL_LIMIT";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DepwalkConfig {
    #[serde(default)]
    pub defaults: WalkDefaults,
}

/// Default walk settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WalkDefaults {
    /// Maximum concurrent visitor calls (absent or 0 = unbounded)
    pub max_concurrency: Option<usize>,

    /// Walk in tear-down order by default
    #[serde(default)]
    pub reverse: bool,
}

impl DepwalkConfig {
    /// Returns `~/.config/depwalk/` on Unix, `%APPDATA%/depwalk/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depwalk")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default location
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GraphError::Config {
            reason: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| GraphError::Config {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(self) -> Result<Self> {
        self.with_parallel_limit(std::env::var(PARALLEL_LIMIT_ENV).ok().as_deref())
    }

    fn with_parallel_limit(mut self, raw: Option<&str>) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(self);
        };

        let limit = raw.parse::<usize>().map_err(|e| GraphError::Config {
            reason: format!("{PARALLEL_LIMIT_ENV}='{raw}' is not a valid limit: {e}"),
        })?;
        self.defaults.max_concurrency = Some(limit);
        Ok(self)
    }

    /// Walk options seeded from these defaults
    pub fn walk_options(&self) -> WalkOptions {
        let direction = if self.defaults.reverse {
            Direction::Inverse
        } else {
            Direction::Forward
        };
        WalkOptions::new()
            .with_direction(direction)
            .with_max_concurrency(self.defaults.max_concurrency.unwrap_or(0))
    }
}
