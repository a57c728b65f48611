//! Error types for configuration synchronization.

use crate::access::AccessMode;
use crate::model::TenantId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for synchronizer operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for calls into the administrative platform.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Result type for configuration store writes.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for reading client configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for wire message encoding.
pub type CodecResult<T> = Result<T, CodecError>;

/// The synchronizer operations, used to give errors and logs context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Pull platform-wide and per-tenant configuration.
    InitializePlatformConfiguration,
    /// Push one file to the platform.
    UpdateConfigurationFile,
    /// Pull every tenant's configuration.
    RetrieveTenantsConfiguration,
    /// Pull one tenant's autologin file.
    RetrieveAutologinConfiguration,
}

impl Operation {
    /// Returns a human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InitializePlatformConfiguration => "initialize platform configuration",
            Operation::UpdateConfigurationFile => "update configuration file",
            Operation::RetrieveTenantsConfiguration => "retrieve tenants configuration",
            Operation::RetrieveAutologinConfiguration => "retrieve autologin configuration",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The operation an error occurred in, plus the tenant it targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationContext {
    /// Operation being executed.
    pub operation: Operation,
    /// Tenant the operation targets, if any.
    pub tenant_id: Option<TenantId>,
}

impl OperationContext {
    /// Context for an operation spanning all tenants.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            tenant_id: None,
        }
    }

    /// Context for an operation targeting one tenant.
    pub fn for_tenant(operation: Operation, tenant_id: TenantId) -> Self {
        Self {
            operation,
            tenant_id: Some(tenant_id),
        }
    }
}

impl fmt::Display for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tenant_id {
            Some(tenant_id) => write!(f, "{} (tenant {})", self.operation, tenant_id),
            None => write!(f, "{}", self.operation),
        }
    }
}

/// Errors reported by the administrative platform or the path to it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformError {
    /// The supplied credentials were rejected.
    #[error("invalid platform credentials")]
    InvalidCredentials,

    /// The session is unknown or already closed.
    #[error("invalid or closed platform session {0}")]
    InvalidSession(u64),

    /// The tenant does not exist.
    #[error("unknown tenant {0}")]
    UnknownTenant(TenantId),

    /// The tenant has no configuration file with that name.
    #[error("unknown configuration file {file_name:?} for tenant {tenant_id}")]
    UnknownFile {
        /// Tenant that was queried.
        tenant_id: TenantId,
        /// Requested file name.
        file_name: String,
    },

    /// The platform refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The platform, or the mechanism to reach it, is not available.
    #[error("platform unavailable: {0}")]
    Unavailable(String),

    /// A message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Errors persisting configuration to the local store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Errors reading client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration source could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configuration document is malformed.
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// The access mode value is not recognised.
    #[error("unknown access mode {0:?}, expected \"local\" or \"remote\"")]
    InvalidAccessMode(String),
}

/// Errors encoding or decoding wire messages.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Encoding failed.
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// Decoding failed.
    #[error("failed to decode message: {0}")]
    Decode(String),
}

/// A login that could not be completed.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AuthenticationError {
    mode: AccessMode,
    message: String,
    #[source]
    source: PlatformError,
}

impl AuthenticationError {
    /// Creates an authentication error.
    pub fn new(mode: AccessMode, message: impl Into<String>, source: PlatformError) -> Self {
        Self {
            mode,
            message: message.into(),
            source,
        }
    }

    /// Access mode the login was attempted under.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Operator-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Underlying cause.
    pub fn cause(&self) -> &PlatformError {
        &self.source
    }
}

/// Broad category of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The access mode could not be resolved.
    AccessMode,
    /// Login was rejected or the local mechanism is unavailable.
    Authentication,
    /// A platform read or write failed after login.
    PlatformOperation,
    /// Persisting a retrieved blob failed.
    StoreWrite,
    /// Releasing the session failed.
    Logout,
}

/// Errors surfaced by the configuration synchronizer.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The access-mode source could not be read.
    #[error("access mode unavailable for {context}: {source}")]
    AccessMode {
        /// Operation context.
        context: OperationContext,
        /// Underlying error.
        source: ConfigError,
    },

    /// No session could be opened.
    #[error("authentication failed for {context}: {source}")]
    Authentication {
        /// Operation context.
        context: OperationContext,
        /// Underlying error.
        source: AuthenticationError,
    },

    /// The platform rejected a read or write.
    #[error("platform call {call} failed during {context}: {source}")]
    PlatformOperation {
        /// Operation context.
        context: OperationContext,
        /// Name of the platform call.
        call: &'static str,
        /// Underlying error.
        source: PlatformError,
        /// Logout failure that followed, if any.
        logout_failure: Option<PlatformError>,
    },

    /// Writing to the configuration store failed.
    #[error("store write failed during {context}: {source}")]
    StoreWrite {
        /// Operation context.
        context: OperationContext,
        /// Underlying error.
        source: StoreError,
        /// Logout failure that followed, if any.
        logout_failure: Option<PlatformError>,
    },

    /// The work succeeded but the session could not be released.
    #[error("logout failed after {context}: {source}")]
    Logout {
        /// Operation context.
        context: OperationContext,
        /// Underlying error.
        source: PlatformError,
    },
}

impl SyncError {
    /// Creates a platform operation error.
    pub fn platform(context: OperationContext, call: &'static str, source: PlatformError) -> Self {
        Self::PlatformOperation {
            context,
            call,
            source,
            logout_failure: None,
        }
    }

    /// Creates a store write error.
    pub fn store(context: OperationContext, source: StoreError) -> Self {
        Self::StoreWrite {
            context,
            source,
            logout_failure: None,
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::AccessMode { .. } => FailureKind::AccessMode,
            SyncError::Authentication { .. } => FailureKind::Authentication,
            SyncError::PlatformOperation { .. } => FailureKind::PlatformOperation,
            SyncError::StoreWrite { .. } => FailureKind::StoreWrite,
            SyncError::Logout { .. } => FailureKind::Logout,
        }
    }

    /// Returns the operation context.
    pub fn context(&self) -> &OperationContext {
        match self {
            SyncError::AccessMode { context, .. }
            | SyncError::Authentication { context, .. }
            | SyncError::PlatformOperation { context, .. }
            | SyncError::StoreWrite { context, .. }
            | SyncError::Logout { context, .. } => context,
        }
    }

    /// Returns the logout failure attached to a failed operation.
    pub fn logout_failure(&self) -> Option<&PlatformError> {
        match self {
            SyncError::PlatformOperation { logout_failure, .. }
            | SyncError::StoreWrite { logout_failure, .. } => logout_failure.as_ref(),
            _ => None,
        }
    }

    /// Attaches a logout failure that happened after this error.
    ///
    /// Only errors raised while a session was open can carry one; any other
    /// error is returned unchanged.
    pub fn with_logout_failure(mut self, failure: PlatformError) -> Self {
        match &mut self {
            SyncError::PlatformOperation { logout_failure, .. }
            | SyncError::StoreWrite { logout_failure, .. } => *logout_failure = Some(failure),
            _ => {}
        }
        self
    }
}
