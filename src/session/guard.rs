//! Session identity and the stale-result guard.
//!
//! Every timer tick and network result carries the [`SessionId`] it was
//! started under and is applied through [`SessionGuard::apply`], which runs
//! it only if that session is still the current one. The check and the
//! update happen under one lock, so a supersession cannot slip between them.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one confirmation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Holds the id of the one session allowed to touch shared state.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
    current: Arc<Mutex<Option<SessionId>>>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a fresh session current, superseding any other.
    pub fn begin(&self) -> SessionId {
        let id = SessionId::new();
        *self.current.lock().expect("session guard mutex poisoned") = Some(id);
        id
    }

    /// Clear `id` if it is still current. Returns whether it was.
    pub fn end(&self, id: SessionId) -> bool {
        let mut current = self.current.lock().expect("session guard mutex poisoned");
        if *current == Some(id) {
            *current = None;
            true
        } else {
            false
        }
    }

    /// Run `f` only while `id` is current; `None` means the result was stale.
    pub fn apply<R>(&self, id: SessionId, f: impl FnOnce() -> R) -> Option<R> {
        let current = self.current.lock().expect("session guard mutex poisoned");
        if *current == Some(id) {
            Some(f())
        } else {
            tracing::trace!(session = %id, "Discarding stale session callback");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_supersedes() {
        let guard = SessionGuard::new();
        let first = guard.begin();
        let second = guard.begin();

        assert_ne!(first, second);
        assert_eq!(guard.apply(first, || 1), None);
        assert_eq!(guard.apply(second, || 2), Some(2));
    }

    #[test]
    fn test_end_only_clears_current() {
        let guard = SessionGuard::new();
        let first = guard.begin();
        let second = guard.begin();

        assert!(!guard.end(first));
        assert_eq!(guard.apply(second, || ()), Some(()));
        assert!(guard.end(second));
        assert!(guard.apply(second, || ()).is_none());
        assert!(!guard.end(second));
    }
}
