//! Platform configuration.

use confsync_core::Credentials;

/// Configuration for the reference platform.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Administrator credentials accepted on remote login.
    pub admin: Credentials,
    /// Maximum number of sessions open at the same time.
    pub max_sessions: usize,
}

impl PlatformConfig {
    /// Creates a configuration accepting the given administrator credentials.
    pub fn new(admin: Credentials) -> Self {
        Self {
            admin,
            max_sessions: 64,
        }
    }

    /// Sets the maximum number of concurrent sessions.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::new(Credentials::new("platformAdmin", "platform"))
    }
}
