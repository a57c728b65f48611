//! Local configuration store abstraction.

use crate::error::{StoreError, StoreResult};
use crate::model::{ConfigFiles, TenantId};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// The local sink for retrieved configuration.
///
/// The synchronizer only ever writes to the store. Writes are overwrites
/// keyed by (tenant, file name); concurrent writers to the same key are not
/// coordinated and the last write wins.
pub trait ConfigurationStore: Send + Sync {
    /// Stores platform-wide configuration files.
    fn set_platform_configuration(&self, files: ConfigFiles) -> StoreResult<()>;

    /// Stores configuration files of one tenant.
    fn set_tenant_configuration(&self, tenant_id: TenantId, files: ConfigFiles)
        -> StoreResult<()>;

    /// Stores one configuration file of one tenant.
    fn set_tenant_configuration_file(
        &self,
        tenant_id: TenantId,
        file_name: &str,
        content: Vec<u8>,
    ) -> StoreResult<()>;
}

/// A write recorded by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    /// Platform-wide files with the given names.
    Platform(Vec<String>),
    /// Files of a tenant.
    Tenant(TenantId, Vec<String>),
    /// One file of a tenant.
    TenantFile(TenantId, String),
}

#[derive(Debug, Default)]
struct MemoryStoreState {
    platform: ConfigFiles,
    tenants: BTreeMap<TenantId, ConfigFiles>,
    writes: Vec<StoreWrite>,
    fail_platform: Option<String>,
    fail_tenants: Option<String>,
}

/// An in-memory configuration store.
///
/// Keeps the latest content per key and a log of every write in order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryStoreState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes platform-wide writes fail with the given reason.
    pub fn fail_platform_writes(&self, reason: impl Into<String>) {
        self.state.write().fail_platform = Some(reason.into());
    }

    /// Makes tenant writes (whole tenant or single file) fail with the given reason.
    pub fn fail_tenant_writes(&self, reason: impl Into<String>) {
        self.state.write().fail_tenants = Some(reason.into());
    }

    /// Returns the stored platform-wide files.
    pub fn platform_configuration(&self) -> ConfigFiles {
        self.state.read().platform.clone()
    }

    /// Returns the stored files of a tenant.
    pub fn tenant_configuration(&self, tenant_id: TenantId) -> Option<ConfigFiles> {
        self.state.read().tenants.get(&tenant_id).cloned()
    }

    /// Returns one stored file of a tenant.
    pub fn tenant_file(&self, tenant_id: TenantId, file_name: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .tenants
            .get(&tenant_id)
            .and_then(|files| files.get(file_name).cloned())
    }

    /// Returns every successful write, in order.
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.state.read().writes.clone()
    }
}

impl ConfigurationStore for MemoryStore {
    fn set_platform_configuration(&self, files: ConfigFiles) -> StoreResult<()> {
        let mut state = self.state.write();
        if let Some(reason) = &state.fail_platform {
            return Err(StoreError::Rejected(reason.clone()));
        }
        state
            .writes
            .push(StoreWrite::Platform(files.keys().cloned().collect()));
        state.platform.extend(files);
        Ok(())
    }

    fn set_tenant_configuration(
        &self,
        tenant_id: TenantId,
        files: ConfigFiles,
    ) -> StoreResult<()> {
        let mut state = self.state.write();
        if let Some(reason) = &state.fail_tenants {
            return Err(StoreError::Rejected(reason.clone()));
        }
        state
            .writes
            .push(StoreWrite::Tenant(tenant_id, files.keys().cloned().collect()));
        state.tenants.entry(tenant_id).or_default().extend(files);
        Ok(())
    }

    fn set_tenant_configuration_file(
        &self,
        tenant_id: TenantId,
        file_name: &str,
        content: Vec<u8>,
    ) -> StoreResult<()> {
        let mut state = self.state.write();
        if let Some(reason) = &state.fail_tenants {
            return Err(StoreError::Rejected(reason.clone()));
        }
        state
            .writes
            .push(StoreWrite::TenantFile(tenant_id, file_name.to_string()));
        state
            .tenants
            .entry(tenant_id)
            .or_default()
            .insert(file_name.to_string(), content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(pairs: &[(&str, &[u8])]) -> ConfigFiles {
        pairs
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_vec()))
            .collect()
    }

    #[test]
    fn writes_overwrite_per_key() {
        let store = MemoryStore::new();
        let tenant = TenantId::new(1);

        store
            .set_tenant_configuration(tenant, files(&[("a.json", b"{}"), ("b.json", b"[]")]))
            .unwrap();
        store
            .set_tenant_configuration_file(tenant, "a.json", b"{\"v\":2}".to_vec())
            .unwrap();

        let stored = store.tenant_configuration(tenant).unwrap();
        assert_eq!(stored["a.json"], b"{\"v\":2}");
        assert_eq!(stored["b.json"], b"[]");
        assert_eq!(store.writes().len(), 2);
    }

    #[test]
    fn write_log_keeps_order() {
        let store = MemoryStore::new();
        store
            .set_platform_configuration(files(&[("platform.properties", b"")]))
            .unwrap();
        store
            .set_tenant_configuration(TenantId::new(2), files(&[("b.json", b"[]")]))
            .unwrap();

        assert_eq!(
            store.writes(),
            vec![
                StoreWrite::Platform(vec!["platform.properties".into()]),
                StoreWrite::Tenant(TenantId::new(2), vec!["b.json".into()]),
            ]
        );
    }

    #[test]
    fn injected_failures() {
        let store = MemoryStore::new();
        store.fail_tenant_writes("disk full");

        let result = store.set_tenant_configuration_file(TenantId::new(1), "a.json", Vec::new());
        assert!(matches!(result, Err(StoreError::Rejected(reason)) if reason == "disk full"));
        assert!(store.writes().is_empty());

        store
            .set_platform_configuration(files(&[("p", b"1")]))
            .unwrap();
        assert_eq!(store.platform_configuration()["p"], b"1");
    }
}
