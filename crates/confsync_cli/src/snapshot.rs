//! Platform snapshot files.
//!
//! A snapshot seeds the in-process platform the CLI synchronizes against:
//!
//! ```json
//! {
//!   "admin": { "username": "platformAdmin", "password": "platform" },
//!   "platform": { "platform-tenant-config.properties": "userName=install" },
//!   "tenants": { "1": { "autologin-v6.json": "[]" } }
//! }
//! ```

use confsync_core::{Credentials, TenantId};
use confsync_platform::{AdminPlatform, PlatformConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Administrator credentials accepted by the snapshot platform.
#[derive(Debug, Deserialize)]
pub struct SnapshotAdmin {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Contents of a platform snapshot file.
#[derive(Debug, Deserialize)]
pub struct PlatformSnapshot {
    /// Administrator credentials; the platform default is used when absent.
    #[serde(default)]
    pub admin: Option<SnapshotAdmin>,
    /// Platform-wide files by name.
    #[serde(default)]
    pub platform: BTreeMap<String, String>,
    /// Tenant files by tenant id, then name.
    #[serde(default)]
    pub tenants: BTreeMap<u64, BTreeMap<String, String>>,
}

impl PlatformSnapshot {
    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a snapshot file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read snapshot {:?}: {}", path, e))?;
        Ok(Self::from_json(&json)?)
    }

    /// Builds a platform holding the snapshot's files.
    pub fn into_platform(self) -> AdminPlatform {
        let config = match self.admin {
            Some(admin) => PlatformConfig::new(Credentials::new(admin.username, admin.password)),
            None => PlatformConfig::default(),
        };
        let platform = AdminPlatform::new(config);
        let catalog = platform.catalog();
        for (name, content) in &self.platform {
            catalog.set_platform_file(name, content.as_bytes());
        }
        for (tenant_id, files) in &self.tenants {
            let tenant_id = TenantId::new(*tenant_id);
            catalog.add_tenant(tenant_id);
            for (name, content) in files {
                catalog.set_tenant_file(tenant_id, name, content.as_bytes());
            }
        }
        platform
    }
}
