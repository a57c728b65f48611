//! Session registry.

use confsync_core::{PlatformError, PlatformResult};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues session ids and tracks which are open.
#[derive(Debug)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    open: RwLock<HashSet<u64>>,
    max_sessions: usize,
}

impl SessionRegistry {
    /// Creates a registry allowing at most `max_sessions` open sessions.
    pub fn new(max_sessions: usize) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            open: RwLock::new(HashSet::new()),
            max_sessions,
        }
    }

    /// Opens a session and returns its id.
    pub fn open(&self) -> PlatformResult<u64> {
        let mut open = self.open.write();
        if open.len() >= self.max_sessions {
            return Err(PlatformError::Rejected(format!(
                "too many open sessions ({})",
                self.max_sessions
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        open.insert(id);
        Ok(id)
    }

    /// Closes a session.
    pub fn close(&self, id: u64) -> PlatformResult<()> {
        if self.open.write().remove(&id) {
            Ok(())
        } else {
            Err(PlatformError::InvalidSession(id))
        }
    }

    /// Fails unless the session is open.
    pub fn check(&self, id: u64) -> PlatformResult<()> {
        if self.open.read().contains(&id) {
            Ok(())
        } else {
            Err(PlatformError::InvalidSession(id))
        }
    }

    /// Returns the number of open sessions.
    pub fn open_count(&self) -> usize {
        self.open.read().len()
    }

    /// Returns the number of sessions ever issued.
    pub fn issued_count(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_check_close() {
        let registry = SessionRegistry::new(4);
        let id = registry.open().unwrap();
        assert!(registry.check(id).is_ok());
        assert_eq!(registry.open_count(), 1);

        registry.close(id).unwrap();
        assert_eq!(registry.check(id), Err(PlatformError::InvalidSession(id)));
        assert_eq!(registry.close(id), Err(PlatformError::InvalidSession(id)));
        assert_eq!(registry.issued_count(), 1);
    }

    #[test]
    fn session_limit() {
        let registry = SessionRegistry::new(1);
        let first = registry.open().unwrap();
        assert!(matches!(registry.open(), Err(PlatformError::Rejected(_))));

        registry.close(first).unwrap();
        assert!(registry.open().is_ok());
    }
}
