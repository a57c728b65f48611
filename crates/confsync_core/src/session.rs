//! Session management.
//!
//! Opens platform sessions under the resolved access mode and closes them.
//! A session opened through [`SessionManager::open`] is held by a
//! [`SessionGuard`], which logs the session out exactly once: explicitly via
//! [`SessionGuard::release`], or on drop if the guard goes out of scope
//! without being released (early return, unwinding).

use crate::access::AccessMode;
use crate::credentials::{Credentials, PASSWORD_PROPERTY, USERNAME_PROPERTY};
use crate::error::{AuthenticationError, PlatformError, PlatformResult};
use crate::platform::{LocalLogin, PlatformLogin, PlatformSession};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Message reported when the local login mechanism cannot be used.
pub const LOCAL_LOGIN_FAILED: &str = "unable to do the local login";

/// Message reported when remote credentials are rejected.
pub fn invalid_credentials_message() -> String {
    format!(
        "The synchronizer is not able to log in to the platform because properties \
         {USERNAME_PROPERTY} and {PASSWORD_PROPERTY} are not set to the platform \
         administrator credentials. These properties must be set when connecting to a \
         remote platform. If the platform runs in the same process, switch the access \
         mode to local."
    )
}

/// Opens and closes platform sessions.
pub struct SessionManager<L: PlatformLogin> {
    credentials: Credentials,
    login_api: Arc<L>,
    local_login: Option<Arc<dyn LocalLogin>>,
}

impl<L: PlatformLogin> SessionManager<L> {
    /// Creates a session manager with remote credentials and the platform login API.
    pub fn new(credentials: Credentials, login_api: Arc<L>) -> Self {
        Self {
            credentials,
            login_api,
            local_login: None,
        }
    }

    /// Registers the in-process login mechanism used in local mode.
    pub fn with_local_login(mut self, local_login: Arc<dyn LocalLogin>) -> Self {
        self.local_login = Some(local_login);
        self
    }

    /// Returns true if a local login mechanism is registered.
    pub fn has_local_login(&self) -> bool {
        self.local_login.is_some()
    }

    /// Opens a session.
    ///
    /// Local mode uses the registered local mechanism; any failure there,
    /// including a missing mechanism, is reported as a generic local login
    /// failure with the original cause attached. Remote mode forwards the
    /// configured credentials; if the platform rejects them the message names
    /// the credential properties and points at local mode.
    pub fn login(&self, mode: AccessMode) -> Result<PlatformSession, AuthenticationError> {
        let session = match mode {
            AccessMode::Local => self.local_platform_login()?,
            AccessMode::Remote => self.remote_platform_login()?,
        };
        debug!(session = session.id(), %mode, "platform session opened");
        Ok(session)
    }

    /// Closes a session.
    pub fn logout(&self, session: &PlatformSession) -> PlatformResult<()> {
        self.login_api.logout(session)?;
        debug!(session = session.id(), "platform session closed");
        Ok(())
    }

    /// Opens a session held by a guard that guarantees its release.
    pub fn open(&self, mode: AccessMode) -> Result<SessionGuard<'_, L>, AuthenticationError> {
        let session = self.login(mode)?;
        Ok(SessionGuard {
            manager: self,
            session,
            released: false,
        })
    }

    fn local_platform_login(&self) -> Result<PlatformSession, AuthenticationError> {
        let local_login = self.local_login.as_ref().ok_or_else(|| {
            AuthenticationError::new(
                AccessMode::Local,
                LOCAL_LOGIN_FAILED,
                PlatformError::Unavailable("no local login mechanism is registered".into()),
            )
        })?;

        local_login
            .login()
            .map_err(|e| AuthenticationError::new(AccessMode::Local, LOCAL_LOGIN_FAILED, e))
    }

    fn remote_platform_login(&self) -> Result<PlatformSession, AuthenticationError> {
        self.login_api
            .login(self.credentials.username(), self.credentials.password())
            .map_err(|e| match e {
                PlatformError::InvalidCredentials => AuthenticationError::new(
                    AccessMode::Remote,
                    invalid_credentials_message(),
                    PlatformError::InvalidCredentials,
                ),
                other => AuthenticationError::new(
                    AccessMode::Remote,
                    "unable to log in to the remote platform",
                    other,
                ),
            })
    }
}

/// An open session that is logged out exactly once.
pub struct SessionGuard<'a, L: PlatformLogin> {
    manager: &'a SessionManager<L>,
    session: PlatformSession,
    released: bool,
}

impl<L: PlatformLogin> SessionGuard<'_, L> {
    /// Returns the held session.
    pub fn session(&self) -> &PlatformSession {
        &self.session
    }

    /// Logs the session out and reports the outcome.
    pub fn release(mut self) -> PlatformResult<()> {
        self.released = true;
        self.manager.logout(&self.session)
    }
}

impl<L: PlatformLogin> Drop for SessionGuard<'_, L> {
    /// Logs out an unreleased session.
    ///
    /// A panicking logout is caught so it never escapes the destructor; a
    /// second panic leaving `drop` while the thread unwinds would abort.
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let session = self.session.id();
        debug!(session, unwinding = thread::panicking(), "releasing session from dropped guard");

        let manager = self.manager;
        let held = &self.session;
        match panic::catch_unwind(AssertUnwindSafe(|| manager.logout(held))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(session, error = %e, "failed to release dropped platform session")
            }
            Err(_) => warn!(session, "logout panicked while releasing dropped platform session"),
        }
    }
}
