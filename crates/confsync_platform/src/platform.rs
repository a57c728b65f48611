//! The administrative platform.

use crate::catalog::ConfigurationCatalog;
use crate::config::PlatformConfig;
use crate::sessions::SessionRegistry;
use confsync_core::{
    ConfigurationUpdate, LocalLogin, PlatformApi, PlatformConfiguration, PlatformError,
    PlatformLogin, PlatformResult, PlatformSession, TenantConfiguration, TenantId,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// In-process administrative platform.
///
/// Serves platform and tenant configuration to administrator sessions.
/// Every API call requires an open session.
#[derive(Debug)]
pub struct AdminPlatform {
    config: PlatformConfig,
    catalog: ConfigurationCatalog,
    sessions: SessionRegistry,
}

impl AdminPlatform {
    /// Creates an empty platform.
    pub fn new(config: PlatformConfig) -> Self {
        let sessions = SessionRegistry::new(config.max_sessions);
        Self {
            config,
            catalog: ConfigurationCatalog::new(),
            sessions,
        }
    }

    /// Returns the configuration catalog.
    pub fn catalog(&self) -> &ConfigurationCatalog {
        &self.catalog
    }

    /// Returns the number of sessions currently open.
    pub fn active_sessions(&self) -> usize {
        self.sessions.open_count()
    }

    /// Returns the number of sessions ever opened.
    pub fn issued_sessions(&self) -> u64 {
        self.sessions.issued_count()
    }

    /// Opens a session without checking credentials.
    ///
    /// Used by code running in the same process as the platform.
    pub fn open_local_session(&self) -> PlatformResult<PlatformSession> {
        let id = self.sessions.open()?;
        debug!(session = id, "local session opened");
        Ok(PlatformSession::new(id))
    }

    fn authorize(&self, session: &PlatformSession) -> PlatformResult<()> {
        self.sessions.check(session.id()).map_err(|e| {
            warn!(session = session.id(), "call with a session that is not open");
            e
        })
    }
}

impl Default for AdminPlatform {
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

impl PlatformLogin for AdminPlatform {
    fn login(&self, username: &str, password: &str) -> PlatformResult<PlatformSession> {
        let admin = &self.config.admin;
        if username != admin.username() || password != admin.password() {
            warn!(username, "administrator login rejected");
            return Err(PlatformError::InvalidCredentials);
        }
        let id = self.sessions.open()?;
        info!(session = id, username, "administrator logged in");
        Ok(PlatformSession::new(id))
    }

    fn logout(&self, session: &PlatformSession) -> PlatformResult<()> {
        self.sessions.close(session.id())?;
        debug!(session = session.id(), "session closed");
        Ok(())
    }
}

impl PlatformApi for AdminPlatform {
    fn platform_configuration(
        &self,
        session: &PlatformSession,
    ) -> PlatformResult<PlatformConfiguration> {
        self.authorize(session)?;
        Ok(self.catalog.platform_configuration())
    }

    fn tenant_configurations(
        &self,
        session: &PlatformSession,
    ) -> PlatformResult<TenantConfiguration> {
        self.authorize(session)?;
        Ok(self.catalog.tenant_configurations())
    }

    fn tenant_configuration_file(
        &self,
        session: &PlatformSession,
        tenant_id: TenantId,
        file_name: &str,
    ) -> PlatformResult<Vec<u8>> {
        self.authorize(session)?;
        self.catalog.tenant_file(tenant_id, file_name)
    }

    fn update_tenant_configuration_file(
        &self,
        session: &PlatformSession,
        update: &ConfigurationUpdate,
    ) -> PlatformResult<()> {
        self.authorize(session)?;
        self.catalog
            .update_tenant_file(update.tenant_id, &update.file_name, &update.content)?;
        info!(
            tenant = %update.tenant_id,
            file = %update.file_name,
            bytes = update.content.len(),
            "tenant configuration file updated"
        );
        Ok(())
    }
}

/// Local login into an [`AdminPlatform`] running in the same process.
///
/// Register it with the synchronizer at startup to enable local mode.
#[derive(Debug, Clone)]
pub struct LocalLoginMechanism {
    platform: Arc<AdminPlatform>,
}

impl LocalLoginMechanism {
    /// Creates a local login bound to the platform.
    pub fn new(platform: Arc<AdminPlatform>) -> Self {
        Self { platform }
    }
}

impl LocalLogin for LocalLoginMechanism {
    fn login(&self) -> PlatformResult<PlatformSession> {
        self.platform.open_local_session()
    }
}
