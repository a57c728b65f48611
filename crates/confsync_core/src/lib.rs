//! # confsync core
//!
//! Session-scoped configuration synchronizer for multi-tenant platforms.
//!
//! This crate provides:
//! - Access mode resolution (local in-process vs. remote networked platform)
//! - Session management with guaranteed release
//! - The configuration synchronizer (platform → local store, and single-file
//!   pushes back to the platform)
//! - The multi-tenant configuration data model
//! - A remote platform adapter over an abstract HTTP client
//!
//! ## Architecture
//!
//! Every synchronizer operation is bracketed by a platform session:
//! 1. Resolve the access mode and log in
//! 2. Run the operation's platform calls and store writes
//! 3. Log out, on every exit path
//!
//! ## Key Invariants
//!
//! - A successful login is followed by exactly one logout
//! - A failed login is never followed by a logout
//! - The operation's own error is reported ahead of a logout error
//! - Platform-wide configuration is stored before tenant configuration
//! - Sessions are never shared between operations

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod config;
mod credentials;
mod error;
mod http;
mod model;
mod platform;
mod protocol;
mod session;
mod store;
mod synchronizer;

pub use access::{AccessMode, AccessModeSource, FixedAccessMode, SettingsFileAccessMode};
pub use config::{ClientSettings, SyncConfig};
pub use credentials::{Credentials, PASSWORD_PROPERTY, USERNAME_PROPERTY};
pub use error::{
    AuthenticationError, CodecError, CodecResult, ConfigError, ConfigResult, FailureKind,
    Operation, OperationContext, PlatformError, PlatformResult, StoreError, StoreResult, SyncError,
    SyncResult,
};
pub use http::{HttpClient, HttpPlatform, LoopbackClient, LoopbackServer};
pub use model::{
    ConfigFiles, ConfigurationUpdate, PlatformConfiguration, TenantConfiguration, TenantId,
    AUTOLOGIN_FILE,
};
pub use platform::{
    ApiCall, LocalLogin, MockPlatform, PlatformApi, PlatformLogin, PlatformSession, RecordedCall,
};
pub use protocol::{PlatformRequest, PlatformResponse, WirePassword, ENDPOINT_PREFIX};
pub use session::{invalid_credentials_message, SessionGuard, SessionManager, LOCAL_LOGIN_FAILED};
pub use store::{ConfigurationStore, MemoryStore, StoreWrite};
pub use synchronizer::ConfigurationSynchronizer;
