//! Configuration held by the platform.

use confsync_core::{
    ConfigFiles, PlatformConfiguration, PlatformError, PlatformResult, TenantConfiguration,
    TenantId,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Platform-wide and per-tenant configuration files.
#[derive(Debug, Default)]
pub struct ConfigurationCatalog {
    platform: RwLock<ConfigFiles>,
    tenants: RwLock<BTreeMap<TenantId, ConfigFiles>>,
}

impl ConfigurationCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a platform-wide file.
    pub fn set_platform_file(&self, name: &str, content: &[u8]) {
        self.platform
            .write()
            .insert(name.to_string(), content.to_vec());
    }

    /// Registers a tenant with no files. Existing tenants are left untouched.
    pub fn add_tenant(&self, tenant_id: TenantId) {
        self.tenants.write().entry(tenant_id).or_default();
    }

    /// Sets a tenant file, registering the tenant if needed.
    pub fn set_tenant_file(&self, tenant_id: TenantId, name: &str, content: &[u8]) {
        self.tenants
            .write()
            .entry(tenant_id)
            .or_default()
            .insert(name.to_string(), content.to_vec());
    }

    /// Returns the platform-wide files.
    pub fn platform_configuration(&self) -> PlatformConfiguration {
        PlatformConfiguration::new(self.platform.read().clone())
    }

    /// Returns every tenant's files.
    pub fn tenant_configurations(&self) -> TenantConfiguration {
        TenantConfiguration::new(self.tenants.read().clone())
    }

    /// Returns one tenant file.
    pub fn tenant_file(&self, tenant_id: TenantId, file_name: &str) -> PlatformResult<Vec<u8>> {
        let tenants = self.tenants.read();
        let files = tenants
            .get(&tenant_id)
            .ok_or(PlatformError::UnknownTenant(tenant_id))?;
        files
            .get(file_name)
            .cloned()
            .ok_or_else(|| PlatformError::UnknownFile {
                tenant_id,
                file_name: file_name.to_string(),
            })
    }

    /// Replaces an existing tenant file.
    ///
    /// Only files the tenant already has can be updated.
    pub fn update_tenant_file(
        &self,
        tenant_id: TenantId,
        file_name: &str,
        content: &[u8],
    ) -> PlatformResult<()> {
        let mut tenants = self.tenants.write();
        let files = tenants
            .get_mut(&tenant_id)
            .ok_or(PlatformError::UnknownTenant(tenant_id))?;
        let file = files
            .get_mut(file_name)
            .ok_or_else(|| PlatformError::UnknownFile {
                tenant_id,
                file_name: file_name.to_string(),
            })?;
        *file = content.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_files() {
        let catalog = ConfigurationCatalog::new();
        catalog.set_tenant_file(TenantId::new(1), "a.json", b"{}");
        catalog.add_tenant(TenantId::new(2));

        assert_eq!(catalog.tenant_configurations().len(), 2);
        assert_eq!(catalog.tenant_file(TenantId::new(1), "a.json").unwrap(), b"{}");
        assert_eq!(
            catalog.tenant_file(TenantId::new(2), "a.json"),
            Err(PlatformError::UnknownFile {
                tenant_id: TenantId::new(2),
                file_name: "a.json".into()
            })
        );
        assert_eq!(
            catalog.tenant_file(TenantId::new(3), "a.json"),
            Err(PlatformError::UnknownTenant(TenantId::new(3)))
        );
    }

    #[test]
    fn update_requires_existing_file() {
        let catalog = ConfigurationCatalog::new();
        catalog.set_tenant_file(TenantId::new(1), "settings.xml", b"<old/>");

        catalog
            .update_tenant_file(TenantId::new(1), "settings.xml", b"<a/>")
            .unwrap();
        assert_eq!(
            catalog.tenant_file(TenantId::new(1), "settings.xml").unwrap(),
            b"<a/>"
        );

        assert!(matches!(
            catalog.update_tenant_file(TenantId::new(1), "new.xml", b""),
            Err(PlatformError::UnknownFile { .. })
        ));
        assert_eq!(
            catalog.update_tenant_file(TenantId::new(7), "settings.xml", b""),
            Err(PlatformError::UnknownTenant(TenantId::new(7)))
        );
    }

    #[test]
    fn platform_files() {
        let catalog = ConfigurationCatalog::new();
        catalog.set_platform_file("platform.properties", b"a=1");
        let configuration = catalog.platform_configuration();
        assert_eq!(configuration.files()["platform.properties"], b"a=1");
    }
}
