//! # Configuration
//!
//! Solarnet configuration is managed by [`confique`], layered from the
//! environment, TOML files and compiled defaults.
//!
//! ## Resolution Order
//!
//! Highest priority first:
//! 1. **Environment variables**: `SOLARNET_HEK_URL`, `SOLARNET_TIMEOUT_SECS`,
//!    `SOLARNET_RESULT_LIMIT`.
//! 2. **Explicit file**: the path passed to [`SolarnetConfig::load`]
//!    (`--config` on the CLI). It must exist.
//! 3. **User file**: `solarnet.toml` in the OS config directory (via the
//!    `directories` crate). Ignored when missing.
//! 4. **Compiled defaults**.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `hek_url` | `http://www.lmsal.com/hek/her` | HEK search endpoint |
//! | `timeout_secs` | `60` | Per-request network timeout |
//! | `result_limit` | unset | Page size requested from the HEK |

use crate::error::{Result, SolarnetError};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HEK_URL: &str = "http://www.lmsal.com/hek/her";
pub const CONFIG_FILE_NAME: &str = "solarnet.toml";

/// Configuration for solarnet, stored in `solarnet.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SolarnetConfig {
    /// HEK search endpoint.
    #[config(env = "SOLARNET_HEK_URL", default = "http://www.lmsal.com/hek/her")]
    pub hek_url: String,

    /// Network timeout per request, in seconds.
    #[config(env = "SOLARNET_TIMEOUT_SECS", default = 60)]
    pub timeout_secs: u64,

    /// Rows per page requested from the HEK. When absent the service decides.
    #[config(env = "SOLARNET_RESULT_LIMIT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_limit: Option<u32>,
}

impl Default for SolarnetConfig {
    fn default() -> Self {
        Self {
            hek_url: DEFAULT_HEK_URL.to_string(),
            timeout_secs: 60,
            result_limit: None,
        }
    }
}

impl SolarnetConfig {
    /// Resolve the full layered configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(SolarnetError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file {} not found", path.display()),
                )));
            }
            builder = builder.file(path);
        }
        if let Some(user) = user_config_path() {
            builder = builder.file(user);
        }
        let config = builder.load()?;
        tracing::debug!(hek_url = %config.hek_url, timeout = config.timeout_secs, "loaded config");
        Ok(config)
    }

    /// Load one TOML file over the defaults, ignoring environment and user
    /// config.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::builder().file(path).load()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `solarnet.toml` in the OS-appropriate config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "solarnet", "solarnet")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
