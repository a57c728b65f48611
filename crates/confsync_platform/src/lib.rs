//! # confsync platform
//!
//! Reference administrative platform for the configuration synchronizer.
//!
//! This crate provides:
//! - Administrator login with credential checks and a session limit
//! - Platform-wide and per-tenant configuration files
//! - In-process local login for code sharing the platform's process
//! - Request dispatch for remote clients (usable through a loopback client)
//!
//! # Example
//!
//! ```rust,ignore
//! use confsync_core::{
//!     ConfigurationSynchronizer, Credentials, HttpPlatform, LoopbackClient, MemoryStore, SyncConfig,
//! };
//! use confsync_platform::{AdminPlatform, PlatformConfig};
//! use std::sync::Arc;
//!
//! let admin = Credentials::new("admin", "secret");
//! let platform = Arc::new(AdminPlatform::new(PlatformConfig::new(admin.clone())));
//! let remote = HttpPlatform::new("http://localhost", LoopbackClient::new(platform.clone()));
//! let config = SyncConfig::default().with_credentials(admin);
//! let synchronizer = ConfigurationSynchronizer::new(config, remote, MemoryStore::new());
//! synchronizer.retrieve_tenants_configuration()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod catalog;
mod config;
mod handler;
mod platform;
mod sessions;

pub use catalog::ConfigurationCatalog;
pub use config::PlatformConfig;
pub use platform::{AdminPlatform, LocalLoginMechanism};
pub use sessions::SessionRegistry;
