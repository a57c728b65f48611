//! Multi-tenant configuration data model.
//!
//! Configuration files are opaque byte blobs keyed by file name. The
//! platform holds one set of platform-wide files and one set per tenant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known name of the file used to bootstrap single-sign-on for a tenant.
pub const AUTOLOGIN_FILE: &str = "autologin-v6.json";

/// Configuration files keyed by file name.
pub type ConfigFiles = BTreeMap<String, Vec<u8>>;

/// Identifier of a tenant, assigned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(u64);

impl TenantId {
    /// Creates a tenant identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for TenantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-wide configuration as retrieved from the platform.
///
/// Immutable once retrieved; handed to the store in full.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfiguration {
    files: ConfigFiles,
}

impl PlatformConfiguration {
    /// Wraps a set of platform-wide files.
    pub fn new(files: ConfigFiles) -> Self {
        Self { files }
    }

    /// Returns the files.
    pub fn files(&self) -> &ConfigFiles {
        &self.files
    }

    /// Returns the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if there are no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consumes the configuration, returning its files.
    pub fn into_files(self) -> ConfigFiles {
        self.files
    }
}

/// Configuration of every tenant, keyed by tenant id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfiguration {
    tenants: BTreeMap<TenantId, ConfigFiles>,
}

impl TenantConfiguration {
    /// Wraps a tenant map.
    pub fn new(tenants: BTreeMap<TenantId, ConfigFiles>) -> Self {
        Self { tenants }
    }

    /// Returns the number of tenants.
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Returns true if there are no tenants.
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

impl IntoIterator for TenantConfiguration {
    type Item = (TenantId, ConfigFiles);
    type IntoIter = std::collections::btree_map::IntoIter<TenantId, ConfigFiles>;

    fn into_iter(self) -> Self::IntoIter {
        self.tenants.into_iter()
    }
}

impl FromIterator<(TenantId, ConfigFiles)> for TenantConfiguration {
    fn from_iter<I: IntoIterator<Item = (TenantId, ConfigFiles)>>(iter: I) -> Self {
        Self {
            tenants: iter.into_iter().collect(),
        }
    }
}

/// A push of one configuration file to the platform.
///
/// Exists only for the duration of the call that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationUpdate {
    /// Target tenant.
    pub tenant_id: TenantId,
    /// Name of the file to replace.
    pub file_name: String,
    /// New content.
    pub content: Vec<u8>,
}

impl ConfigurationUpdate {
    /// Creates an update.
    pub fn new(tenant_id: TenantId, file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            tenant_id,
            file_name: file_name.into(),
            content,
        }
    }
}
