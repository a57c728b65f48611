//! Access mode resolution.
//!
//! The platform is reached either in-process (`Local`) or across a network
//! boundary (`Remote`). The mode is read from externally held configuration
//! once per operation.

use crate::config::ClientSettings;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How the administrative platform is reached.
///
/// Deserializes with the same rules as [`FromStr`]: `local`, `remote` or
/// `http`, in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// The platform runs in the same process; no credential exchange.
    Local,
    /// The platform is reached over the network with administrator credentials.
    Remote,
}

impl AccessMode {
    /// Returns the lower-case name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Local => "local",
            AccessMode::Remote => "remote",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(AccessMode::Local),
            "remote" | "http" => Ok(AccessMode::Remote),
            _ => Err(ConfigError::InvalidAccessMode(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for AccessMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Externally held configuration naming the active access mode.
///
/// Queried at the start of every synchronization operation. Implementations
/// must not have side effects; failing to reach the underlying source is
/// reported as an I/O error.
pub trait AccessModeSource: Send + Sync {
    /// Returns the access mode currently configured.
    fn access_mode(&self) -> ConfigResult<AccessMode>;
}

/// An access mode fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct FixedAccessMode(pub AccessMode);

impl AccessModeSource for FixedAccessMode {
    fn access_mode(&self) -> ConfigResult<AccessMode> {
        Ok(self.0)
    }
}

/// Reads the access mode from a JSON settings file on every resolution.
///
/// Edits to the file take effect on the next operation.
#[derive(Debug, Clone)]
pub struct SettingsFileAccessMode {
    path: PathBuf,
}

impl SettingsFileAccessMode {
    /// Creates a source backed by the settings file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AccessModeSource for SettingsFileAccessMode {
    fn access_mode(&self) -> ConfigResult<AccessMode> {
        Ok(ClientSettings::load(&self.path)?.access_mode)
    }
}
