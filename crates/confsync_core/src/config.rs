//! Configuration for the synchronizer.

use crate::access::AccessMode;
use crate::credentials::Credentials;
use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Client settings document, as stored in a JSON settings file.
///
/// ```json
/// {
///   "access_mode": "remote",
///   "platform.admin.username": "platformAdmin",
///   "platform.admin.password": "platform"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// How the platform is reached.
    pub access_mode: AccessMode,
    /// Administrator user name (remote mode).
    #[serde(rename = "platform.admin.username", default)]
    pub username: Option<String>,
    /// Administrator password (remote mode).
    #[serde(rename = "platform.admin.password", default)]
    pub password: Option<String>,
}

impl ClientSettings {
    /// Parses settings from a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Access mode used when no other source is configured.
    pub access_mode: AccessMode,
    /// Administrator credentials forwarded on remote login.
    pub credentials: Credentials,
}

impl SyncConfig {
    /// Creates a configuration for the given access mode with empty credentials.
    pub fn new(access_mode: AccessMode) -> Self {
        Self {
            access_mode,
            credentials: Credentials::default(),
        }
    }

    /// Builds a configuration from a settings document.
    ///
    /// Absent credential properties become empty strings; they are forwarded
    /// as-is and left for the platform to reject.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            access_mode: settings.access_mode,
            credentials: Credentials::new(
                settings.username.clone().unwrap_or_default(),
                settings.password.clone().unwrap_or_default(),
            ),
        }
    }

    /// Sets the access mode.
    pub fn with_access_mode(mut self, access_mode: AccessMode) -> Self {
        self.access_mode = access_mode;
        self
    }

    /// Sets the administrator credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(AccessMode::Remote)
    }
}
