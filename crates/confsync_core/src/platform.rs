//! Administrative platform abstraction.
//!
//! The synchronizer talks to the platform only through these traits. A
//! [`PlatformSession`] is required for every configuration call.

use crate::error::{PlatformError, PlatformResult};
use crate::model::{
    ConfigFiles, ConfigurationUpdate, PlatformConfiguration, TenantConfiguration, TenantId,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// An authenticated platform session.
///
/// Opaque to the synchronizer. Not `Clone`: each session is owned by exactly
/// one operation and released through the guard that opened it.
#[derive(Debug, PartialEq, Eq)]
pub struct PlatformSession {
    id: u64,
}

impl PlatformSession {
    /// Wraps a session identifier issued by the platform.
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// Returns the platform-issued identifier.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for PlatformSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.id)
    }
}

/// Login and logout against the platform.
pub trait PlatformLogin: Send + Sync {
    /// Opens a session with administrator credentials.
    fn login(&self, username: &str, password: &str) -> PlatformResult<PlatformSession>;

    /// Closes a session.
    fn logout(&self, session: &PlatformSession) -> PlatformResult<()>;
}

/// In-process login that bypasses credential exchange.
///
/// Only available when the platform runs in the same process.
pub trait LocalLogin: Send + Sync {
    /// Opens a session without credentials.
    fn login(&self) -> PlatformResult<PlatformSession>;
}

/// Configuration calls exposed by the platform.
pub trait PlatformApi: Send + Sync {
    /// Returns the platform-wide configuration files.
    fn platform_configuration(&self, session: &PlatformSession)
        -> PlatformResult<PlatformConfiguration>;

    /// Returns the configuration files of every tenant.
    fn tenant_configurations(&self, session: &PlatformSession)
        -> PlatformResult<TenantConfiguration>;

    /// Returns one configuration file of one tenant.
    fn tenant_configuration_file(
        &self,
        session: &PlatformSession,
        tenant_id: TenantId,
        file_name: &str,
    ) -> PlatformResult<Vec<u8>>;

    /// Replaces one configuration file of one tenant.
    fn update_tenant_configuration_file(
        &self,
        session: &PlatformSession,
        update: &ConfigurationUpdate,
    ) -> PlatformResult<()>;
}

/// The configuration calls of [`PlatformApi`], named for errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCall {
    /// [`PlatformApi::platform_configuration`].
    PlatformConfiguration,
    /// [`PlatformApi::tenant_configurations`].
    TenantConfigurations,
    /// [`PlatformApi::tenant_configuration_file`].
    TenantConfigurationFile,
    /// [`PlatformApi::update_tenant_configuration_file`].
    UpdateTenantConfigurationFile,
}

impl ApiCall {
    /// Returns the call name.
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::PlatformConfiguration => "platform_configuration",
            ApiCall::TenantConfigurations => "tenant_configurations",
            ApiCall::TenantConfigurationFile => "tenant_configuration_file",
            ApiCall::UpdateTenantConfigurationFile => "update_tenant_configuration_file",
        }
    }
}

/// A call recorded by [`MockPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// Credential login with the given user name.
    Login {
        /// User name presented.
        username: String,
    },
    /// Local login.
    LocalLogin,
    /// Logout of the given session id.
    Logout(u64),
    /// A configuration call.
    Api(ApiCall),
}

/// A scriptable platform for testing.
///
/// Serves configuration from memory, records every call, tracks open
/// sessions, and can be told to fail login, logout, or any configuration
/// call.
#[derive(Debug, Default)]
pub struct MockPlatform {
    next_session: AtomicU64,
    open_sessions: Mutex<BTreeSet<u64>>,
    calls: Mutex<Vec<RecordedCall>>,
    platform_files: Mutex<ConfigFiles>,
    tenants: Mutex<BTreeMap<TenantId, ConfigFiles>>,
    login_failure: Mutex<Option<PlatformError>>,
    logout_failure: Mutex<Option<PlatformError>>,
    call_failures: Mutex<HashMap<ApiCall, PlatformError>>,
}

impl MockPlatform {
    /// Creates an empty mock platform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a platform-wide file.
    pub fn set_platform_file(&self, name: &str, content: &[u8]) {
        self.platform_files
            .lock()
            .insert(name.to_string(), content.to_vec());
    }

    /// Adds a file to a tenant, creating the tenant if needed.
    pub fn set_tenant_file(&self, tenant_id: TenantId, name: &str, content: &[u8]) {
        self.tenants
            .lock()
            .entry(tenant_id)
            .or_default()
            .insert(name.to_string(), content.to_vec());
    }

    /// Makes every login (credential and local) fail with `error`.
    pub fn fail_login(&self, error: PlatformError) {
        *self.login_failure.lock() = Some(error);
    }

    /// Makes every logout fail with `error`. The session stays open.
    pub fn fail_logout(&self, error: PlatformError) {
        *self.logout_failure.lock() = Some(error);
    }

    /// Makes one configuration call fail with `error`.
    pub fn fail_call(&self, call: ApiCall, error: PlatformError) {
        self.call_failures.lock().insert(call, error);
    }

    /// Returns every recorded call, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of login attempts, credential or local.
    pub fn login_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Login { .. } | RecordedCall::LocalLogin))
            .count()
    }

    /// Returns the number of logout attempts.
    pub fn logout_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Logout(_)))
            .count()
    }

    /// Returns the number of sessions opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.lock().len()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().push(call);
    }

    fn open_session(&self) -> PlatformResult<PlatformSession> {
        if let Some(error) = self.login_failure.lock().clone() {
            return Err(error);
        }
        let id = self.next_session.fetch_add(1, Ordering::SeqCst) + 1;
        self.open_sessions.lock().insert(id);
        Ok(PlatformSession::new(id))
    }

    fn begin_call(&self, call: ApiCall, session: &PlatformSession) -> PlatformResult<()> {
        self.record(RecordedCall::Api(call));
        if !self.open_sessions.lock().contains(&session.id()) {
            return Err(PlatformError::InvalidSession(session.id()));
        }
        match self.call_failures.lock().get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl PlatformLogin for MockPlatform {
    fn login(&self, username: &str, _password: &str) -> PlatformResult<PlatformSession> {
        self.record(RecordedCall::Login {
            username: username.to_string(),
        });
        self.open_session()
    }

    fn logout(&self, session: &PlatformSession) -> PlatformResult<()> {
        self.record(RecordedCall::Logout(session.id()));
        if let Some(error) = self.logout_failure.lock().clone() {
            return Err(error);
        }
        if self.open_sessions.lock().remove(&session.id()) {
            Ok(())
        } else {
            Err(PlatformError::InvalidSession(session.id()))
        }
    }
}

impl LocalLogin for MockPlatform {
    fn login(&self) -> PlatformResult<PlatformSession> {
        self.record(RecordedCall::LocalLogin);
        self.open_session()
    }
}

impl PlatformApi for MockPlatform {
    fn platform_configuration(
        &self,
        session: &PlatformSession,
    ) -> PlatformResult<PlatformConfiguration> {
        self.begin_call(ApiCall::PlatformConfiguration, session)?;
        Ok(PlatformConfiguration::new(self.platform_files.lock().clone()))
    }

    fn tenant_configurations(
        &self,
        session: &PlatformSession,
    ) -> PlatformResult<TenantConfiguration> {
        self.begin_call(ApiCall::TenantConfigurations, session)?;
        Ok(TenantConfiguration::new(self.tenants.lock().clone()))
    }

    fn tenant_configuration_file(
        &self,
        session: &PlatformSession,
        tenant_id: TenantId,
        file_name: &str,
    ) -> PlatformResult<Vec<u8>> {
        self.begin_call(ApiCall::TenantConfigurationFile, session)?;
        let tenants = self.tenants.lock();
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

    fn update_tenant_configuration_file(
        &self,
        session: &PlatformSession,
        update: &ConfigurationUpdate,
    ) -> PlatformResult<()> {
        self.begin_call(ApiCall::UpdateTenantConfigurationFile, session)?;
        let mut tenants = self.tenants.lock();
        let files = tenants
            .get_mut(&update.tenant_id)
            .ok_or(PlatformError::UnknownTenant(update.tenant_id))?;
        files.insert(update.file_name.clone(), update.content.clone());
        Ok(())
    }
}
