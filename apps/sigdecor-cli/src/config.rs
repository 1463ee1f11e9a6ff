//! Configuration file for the `sigdecor` command
//!
//! ```toml
//! [decoration.curve]
//! color = "#0f766e"
//! top_length_max = 60
//!
//! [cleanup]
//! settle_delay_ms = 250
//!
//! [session]
//! logged_in_user = "alice@example.com"
//! ```
//!
//! Every section is optional.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use sigdecor_core::{DecorConfig, DecorConfigOverrides, SessionOptions, DEFAULT_SETTLE_DELAY};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides applied on top of the built-in decoration defaults
    pub decoration: DecorConfigOverrides,
    pub cleanup: CleanupSection,
    pub session: SessionSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSection {
    /// Wait before inspecting host state after a signature is created
    pub settle_delay_ms: u64,
}

impl Default for CleanupSection {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub logged_in_user: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Decoration defaults merged with the file's overrides, validated
    pub fn decor_config(&self) -> anyhow::Result<DecorConfig> {
        DecorConfig::try_from_overrides(&self.decoration).context("Invalid [decoration] configuration")
    }

    /// Session options; a user given on the command line wins over the file
    pub fn session_options(&self, user: Option<&str>) -> SessionOptions {
        SessionOptions {
            logged_in_user: user
                .map(str::to_string)
                .or_else(|| self.session.logged_in_user.clone()),
            settle_delay: Duration::from_millis(self.cleanup.settle_delay_ms),
        }
    }
}
