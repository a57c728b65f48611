//! Session-scoped configuration synchronizer.

use crate::access::{AccessModeSource, FixedAccessMode};
use crate::config::SyncConfig;
use crate::error::{Operation, OperationContext, SyncError, SyncResult};
use crate::model::{ConfigurationUpdate, TenantId, AUTOLOGIN_FILE};
use crate::platform::{ApiCall, LocalLogin, PlatformApi, PlatformLogin, PlatformSession};
use crate::session::SessionManager;
use crate::store::ConfigurationStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Moves configuration between the administrative platform and the local store.
///
/// Every operation runs the same protocol:
///
/// 1. resolve the access mode and open a session (a failure here ends the
///    operation; there is nothing to release),
/// 2. run the platform calls and store writes of the operation,
/// 3. log the session out exactly once, whatever step 2 returned.
///
/// If step 2 fails its error is returned, with any logout failure attached
/// as a secondary error. If only the logout fails, that failure is returned.
///
/// Operations may run concurrently; each opens its own session. Writes to the
/// store are not coordinated between operations, so racing writes to the
/// same (tenant, file) key resolve last-write-wins.
pub struct ConfigurationSynchronizer<P, S>
where
    P: PlatformLogin + PlatformApi,
    S: ConfigurationStore,
{
    access: Arc<dyn AccessModeSource>,
    sessions: SessionManager<P>,
    platform: Arc<P>,
    store: Arc<S>,
}

impl<P, S> ConfigurationSynchronizer<P, S>
where
    P: PlatformLogin + PlatformApi,
    S: ConfigurationStore,
{
    /// Creates a synchronizer.
    ///
    /// The access mode is fixed to `config.access_mode` until another source
    /// is set with [`with_access_mode_source`](Self::with_access_mode_source).
    pub fn new(config: SyncConfig, platform: P, store: S) -> Self {
        Self::with_shared(config, Arc::new(platform), Arc::new(store))
    }

    /// Creates a synchronizer over a platform and store shared with other owners.
    pub fn with_shared(config: SyncConfig, platform: Arc<P>, store: Arc<S>) -> Self {
        Self {
            access: Arc::new(FixedAccessMode(config.access_mode)),
            sessions: SessionManager::new(config.credentials, Arc::clone(&platform)),
            platform,
            store,
        }
    }

    /// Sets the source the access mode is resolved from before each operation.
    pub fn with_access_mode_source(mut self, source: impl AccessModeSource + 'static) -> Self {
        self.access = Arc::new(source);
        self
    }

    /// Registers the in-process login mechanism used in local mode.
    pub fn with_local_login(mut self, local_login: Arc<dyn LocalLogin>) -> Self {
        self.sessions = self.sessions.with_local_login(local_login);
        self
    }

    /// Returns the platform.
    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Pulls platform-wide configuration, then every tenant's configuration,
    /// into the store.
    ///
    /// Platform-wide files are always written before any tenant file.
    pub fn initialize_platform_configuration(&self) -> SyncResult<()> {
        let context = OperationContext::new(Operation::InitializePlatformConfiguration);
        self.with_session(context, |session| {
            self.store_platform_configuration(context, session)?;
            self.store_tenants_configuration(context, session)
        })
    }

    /// Pushes one configuration file of one tenant to the platform.
    pub fn update_configuration_file(
        &self,
        tenant_id: TenantId,
        file_name: &str,
        content: Vec<u8>,
    ) -> SyncResult<()> {
        let context = OperationContext::for_tenant(Operation::UpdateConfigurationFile, tenant_id);
        let update = ConfigurationUpdate::new(tenant_id, file_name, content);
        self.with_session(context, |session| {
            self.platform
                .update_tenant_configuration_file(session, &update)
                .map_err(|e| {
                    SyncError::platform(context, ApiCall::UpdateTenantConfigurationFile.name(), e)
                })
        })
    }

    /// Pulls every tenant's configuration into the store.
    pub fn retrieve_tenants_configuration(&self) -> SyncResult<()> {
        let context = OperationContext::new(Operation::RetrieveTenantsConfiguration);
        self.with_session(context, |session| {
            self.store_tenants_configuration(context, session)
        })
    }

    /// Pulls one tenant's autologin file into the store.
    pub fn retrieve_autologin_configuration(&self, tenant_id: TenantId) -> SyncResult<()> {
        let context =
            OperationContext::for_tenant(Operation::RetrieveAutologinConfiguration, tenant_id);
        self.with_session(context, |session| {
            let content = self
                .platform
                .tenant_configuration_file(session, tenant_id, AUTOLOGIN_FILE)
                .map_err(|e| {
                    SyncError::platform(context, ApiCall::TenantConfigurationFile.name(), e)
                })?;
            self.store
                .set_tenant_configuration_file(tenant_id, AUTOLOGIN_FILE, content)
                .map_err(|e| SyncError::store(context, e))
        })
    }

    /// Runs `work` inside a session that is released on every exit path.
    fn with_session<T>(
        &self,
        context: OperationContext,
        work: impl FnOnce(&PlatformSession) -> SyncResult<T>,
    ) -> SyncResult<T> {
        let mode = self
            .access
            .access_mode()
            .map_err(|source| SyncError::AccessMode { context, source })?;
        let guard = self
            .sessions
            .open(mode)
            .map_err(|source| SyncError::Authentication { context, source })?;

        debug!(%context, session = guard.session().id(), %mode, "operation started");
        let outcome = work(guard.session());
        let released = guard.release();

        match (outcome, released) {
            (Ok(value), Ok(())) => {
                info!(%context, "operation completed");
                Ok(value)
            }
            (Ok(_), Err(source)) => Err(SyncError::Logout { context, source }),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(logout)) => {
                warn!(%context, error = %logout, "logout failed after a failed operation");
                Err(error.with_logout_failure(logout))
            }
        }
    }

    fn store_platform_configuration(
        &self,
        context: OperationContext,
        session: &PlatformSession,
    ) -> SyncResult<()> {
        let configuration = self
            .platform
            .platform_configuration(session)
            .map_err(|e| SyncError::platform(context, ApiCall::PlatformConfiguration.name(), e))?;
        debug!(%context, files = configuration.len(), "storing platform configuration");
        self.store
            .set_platform_configuration(configuration.into_files())
            .map_err(|e| SyncError::store(context, e))
    }

    fn store_tenants_configuration(
        &self,
        context: OperationContext,
        session: &PlatformSession,
    ) -> SyncResult<()> {
        let tenants = self
            .platform
            .tenant_configurations(session)
            .map_err(|e| SyncError::platform(context, ApiCall::TenantConfigurations.name(), e))?;
        debug!(%context, tenants = tenants.len(), "storing tenant configuration");
        for (tenant_id, files) in tenants {
            self.store
                .set_tenant_configuration(tenant_id, files)
                .map_err(|e| {
                    SyncError::store(OperationContext::for_tenant(context.operation, tenant_id), e)
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessMode;
    use crate::credentials::{Credentials, PASSWORD_PROPERTY, USERNAME_PROPERTY};
    use crate::error::{FailureKind, PlatformError, StoreError};
    use crate::model::ConfigFiles;
    use crate::platform::{MockPlatform, RecordedCall};
    use crate::store::{MemoryStore, StoreWrite};

    fn synchronizer(mode: AccessMode) -> ConfigurationSynchronizer<MockPlatform, MemoryStore> {
        let config =
            SyncConfig::new(mode).with_credentials(Credentials::new("platformAdmin", "platform"));
        let platform = Arc::new(MockPlatform::new());
        ConfigurationSynchronizer::with_shared(config, platform.clone(), Arc::new(MemoryStore::new()))
            .with_local_login(platform)
    }

    fn files(pairs: &[(&str, &[u8])]) -> ConfigFiles {
        pairs
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_vec()))
            .collect()
    }

    fn assert_single_session(sync: &ConfigurationSynchronizer<MockPlatform, MemoryStore>) {
        assert_eq!(sync.platform().login_count(), 1);
        assert_eq!(sync.platform().logout_count(), 1);
        assert_eq!(sync.platform().open_sessions(), 0);
    }

    #[test]
    fn retrieve_tenants_writes_each_tenant() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform().set_tenant_file(TenantId::new(1), "a.json", b"{}");
        sync.platform().set_tenant_file(TenantId::new(2), "b.json", b"[]");

        sync.retrieve_tenants_configuration().unwrap();

        let writes = sync.store().writes();
        assert_eq!(writes.len(), 2);
        assert!(writes.contains(&StoreWrite::Tenant(TenantId::new(1), vec!["a.json".into()])));
        assert!(writes.contains(&StoreWrite::Tenant(TenantId::new(2), vec!["b.json".into()])));
        assert_eq!(
            sync.store().tenant_configuration(TenantId::new(1)),
            Some(files(&[("a.json", b"{}")]))
        );
        assert_eq!(
            sync.store().tenant_configuration(TenantId::new(2)),
            Some(files(&[("b.json", b"[]")]))
        );
        assert_single_session(&sync);
    }

    #[test]
    fn retrieve_autologin_writes_one_file() {
        let sync = synchronizer(AccessMode::Local);
        sync.platform()
            .set_tenant_file(TenantId::new(42), AUTOLOGIN_FILE, b"{\"user\":\"x\"}");
        sync.platform()
            .set_tenant_file(TenantId::new(42), "other.json", b"{}");

        sync.retrieve_autologin_configuration(TenantId::new(42)).unwrap();

        assert_eq!(
            sync.store().writes(),
            vec![StoreWrite::TenantFile(TenantId::new(42), "autologin-v6.json".into())]
        );
        assert_eq!(
            sync.store().tenant_file(TenantId::new(42), AUTOLOGIN_FILE),
            Some(b"{\"user\":\"x\"}".to_vec())
        );
        assert_eq!(sync.platform().calls()[0], RecordedCall::LocalLogin);
        assert_single_session(&sync);
    }

    #[test]
    fn initialize_writes_platform_before_tenants() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform().set_platform_file("platform.properties", b"a=1");
        sync.platform().set_tenant_file(TenantId::new(1), "a.json", b"{}");
        sync.platform().set_tenant_file(TenantId::new(2), "b.json", b"[]");

        sync.initialize_platform_configuration().unwrap();

        let writes = sync.store().writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(
            writes[0],
            StoreWrite::Platform(vec!["platform.properties".into()])
        );
        assert!(writes[1..]
            .iter()
            .all(|write| matches!(write, StoreWrite::Tenant(..))));
        assert_single_session(&sync);
    }

    #[test]
    fn update_pushes_file() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform()
            .set_tenant_file(TenantId::new(7), "settings.xml", b"<old/>");

        sync.update_configuration_file(TenantId::new(7), "settings.xml", b"<a/>".to_vec())
            .unwrap();

        assert_eq!(
            sync.platform().calls()[1],
            RecordedCall::Api(ApiCall::UpdateTenantConfigurationFile)
        );
        assert!(sync.store().writes().is_empty());
        assert_single_session(&sync);
    }

    #[test]
    fn rejected_update_still_logs_out() {
        let sync = synchronizer(AccessMode::Remote);

        let err = sync
            .update_configuration_file(TenantId::new(7), "settings.xml", b"<a/>".to_vec())
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::PlatformOperation);
        assert_eq!(err.context().tenant_id, Some(TenantId::new(7)));
        assert!(matches!(
            err,
            SyncError::PlatformOperation {
                source: PlatformError::UnknownTenant(_),
                ..
            }
        ));
        assert_single_session(&sync);
    }

    #[test]
    fn store_failure_still_logs_out() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform().set_platform_file("platform.properties", b"a=1");
        sync.platform().set_tenant_file(TenantId::new(3), "a.json", b"{}");
        sync.store().fail_tenant_writes("disk full");

        let err = sync.initialize_platform_configuration().unwrap_err();

        assert_eq!(err.kind(), FailureKind::StoreWrite);
        assert_eq!(err.context().tenant_id, Some(TenantId::new(3)));
        assert!(matches!(
            err,
            SyncError::StoreWrite {
                source: StoreError::Rejected(_),
                ..
            }
        ));
        // Platform files made it in before the tenant write failed.
        assert_eq!(sync.store().writes().len(), 1);
        assert_single_session(&sync);
    }

    #[test]
    fn work_error_wins_over_logout_error() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform().fail_call(
            ApiCall::TenantConfigurations,
            PlatformError::Rejected("maintenance".into()),
        );
        sync.platform()
            .fail_logout(PlatformError::Unavailable("connection reset".into()));

        let err = sync.retrieve_tenants_configuration().unwrap_err();

        assert_eq!(err.kind(), FailureKind::PlatformOperation);
        assert_eq!(
            err.logout_failure(),
            Some(&PlatformError::Unavailable("connection reset".into()))
        );
        assert_eq!(sync.platform().logout_count(), 1);
    }

    #[test]
    fn logout_failure_alone_is_fatal() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform()
            .fail_logout(PlatformError::Unavailable("connection reset".into()));

        let err = sync.retrieve_tenants_configuration().unwrap_err();

        assert_eq!(err.kind(), FailureKind::Logout);
        assert_eq!(sync.platform().logout_count(), 1);
    }

    #[test]
    fn failed_login_skips_logout() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform().fail_login(PlatformError::InvalidCredentials);

        let err = sync.retrieve_tenants_configuration().unwrap_err();

        assert_eq!(err.kind(), FailureKind::Authentication);
        let message = err.to_string();
        assert!(message.contains(USERNAME_PROPERTY));
        assert!(message.contains(PASSWORD_PROPERTY));
        assert!(message.contains("local"));
        assert_eq!(sync.platform().login_count(), 1);
        assert_eq!(sync.platform().logout_count(), 0);
        assert!(sync.store().writes().is_empty());
    }

    #[test]
    fn unreadable_access_mode_skips_login() {
        struct Unreadable;

        impl AccessModeSource for Unreadable {
            fn access_mode(&self) -> crate::error::ConfigResult<AccessMode> {
                Err(crate::error::ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "settings file missing",
                )))
            }
        }

        let sync = synchronizer(AccessMode::Remote).with_access_mode_source(Unreadable);

        let err = sync.initialize_platform_configuration().unwrap_err();

        assert_eq!(err.kind(), FailureKind::AccessMode);
        assert_eq!(
            err.context().operation,
            Operation::InitializePlatformConfiguration
        );
        assert!(sync.platform().calls().is_empty());
        assert!(sync.store().writes().is_empty());
    }

    #[test]
    fn local_mode_without_mechanism() {
        let config = SyncConfig::new(AccessMode::Local);
        let sync = ConfigurationSynchronizer::new(config, MockPlatform::new(), MemoryStore::new());

        let err = sync.retrieve_autologin_configuration(TenantId::new(1)).unwrap_err();

        assert_eq!(err.kind(), FailureKind::Authentication);
        assert!(matches!(
            &err,
            SyncError::Authentication { source, .. }
                if matches!(source.cause(), PlatformError::Unavailable(_))
        ));
        assert_eq!(sync.platform().logout_count(), 0);
    }

    #[test]
    fn access_mode_is_resolved_per_operation() {
        struct Flipping(parking_lot::Mutex<AccessMode>);

        impl AccessModeSource for Flipping {
            fn access_mode(&self) -> crate::error::ConfigResult<AccessMode> {
                let mut mode = self.0.lock();
                let current = *mode;
                *mode = match current {
                    AccessMode::Local => AccessMode::Remote,
                    AccessMode::Remote => AccessMode::Local,
                };
                Ok(current)
            }
        }

        let sync = synchronizer(AccessMode::Remote)
            .with_access_mode_source(Flipping(parking_lot::Mutex::new(AccessMode::Local)));

        sync.retrieve_tenants_configuration().unwrap();
        sync.retrieve_tenants_configuration().unwrap();

        let logins: Vec<RecordedCall> = sync
            .platform()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, RecordedCall::Login { .. } | RecordedCall::LocalLogin))
            .collect();
        assert_eq!(
            logins,
            vec![
                RecordedCall::LocalLogin,
                RecordedCall::Login {
                    username: "platformAdmin".into()
                }
            ]
        );
    }

    #[test]
    fn concurrent_operations_use_separate_sessions() {
        let sync = synchronizer(AccessMode::Remote);
        sync.platform().set_tenant_file(TenantId::new(1), "a.json", b"{}");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| sync.retrieve_tenants_configuration().unwrap());
            }
        });

        assert_eq!(sync.platform().login_count(), 8);
        assert_eq!(sync.platform().logout_count(), 8);
        assert_eq!(sync.platform().open_sessions(), 0);
        assert_eq!(sync.store().writes().len(), 8);
    }
}
