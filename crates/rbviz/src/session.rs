//! Viewer sessions: admission control for external viewers.
//!
//! Opening a viewer (a browser tab, a desktop window) is left to a
//! [`Viewer`] implementation. The registry only caps how many sessions may
//! be open at once and tracks them by id until they are closed.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::ViewerError;

/// Default cap on simultaneously open viewer sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10;

/// Identifier of an open viewer session: 128 random bits, hex encoded.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random session id.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0.get(..8).unwrap_or(&self.0))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something that can display a snapshot outside the process.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait Viewer: Send + Sync {
    /// Show `wire` (or an empty viewer awaiting input when `None`).
    ///
    /// `session` identifies the view so the caller can later report it closed.
    fn show(&self, session: &SessionId, wire: Option<&str>) -> Result<(), ViewerError>;
}

/// Process-wide bounded set of open viewer sessions.
///
/// Construct one and share it with whatever opens viewers; there is no
/// global instance.
pub struct SessionRegistry {
    max_sessions: usize,
    open: Mutex<HashSet<SessionId>>,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            max_sessions,
            open: Mutex::new(HashSet::new()),
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Open a viewer session if below the cap.
    ///
    /// Returns `Ok(None)` without calling the viewer when the cap is
    /// reached. If the viewer fails, its slot is released and the error
    /// returned.
    pub fn open<V: Viewer + ?Sized>(
        &self,
        viewer: &V,
        wire: Option<&str>,
    ) -> Result<Option<SessionId>, ViewerError> {
        let Some(id) = self.admit() else {
            debug!(max = self.max_sessions, "viewer session cap reached; not opening");
            return Ok(None);
        };

        if let Err(e) = viewer.show(&id, wire) {
            warn!(session = %id, error = %e, "viewer failed to open");
            self.close(&id);
            return Err(e);
        }
        info!(session = %id, "opened viewer session");
        Ok(Some(id))
    }

    /// Stop counting a session against the cap.
    ///
    /// Returns whether the session was open. Closing twice is harmless.
    pub fn close(&self, id: &SessionId) -> bool {
        let removed = self.lock().remove(id);
        if removed {
            debug!(session = %id, "closed viewer session");
        }
        removed
    }

    pub fn is_open(&self, id: &SessionId) -> bool {
        self.lock().contains(id)
    }

    pub fn open_count(&self) -> usize {
        self.lock().len()
    }

    fn admit(&self) -> Option<SessionId> {
        let mut open = self.lock();
        if open.len() >= self.max_sessions {
            return None;
        }
        let id = SessionId::generate();
        open.insert(id.clone());
        Some(id)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SessionId>> {
        // The set is always left consistent, so a poisoned lock is still usable
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

/// A viewer that records what it was asked to show, for testing.
pub mod memory {
    use super::*;

    /// Records every `show` call; optionally fails each one.
    #[derive(Default)]
    pub struct MemoryViewer {
        shown: Mutex<Vec<(SessionId, Option<String>)>>,
        fail: bool,
    }

    impl MemoryViewer {
        pub fn new() -> Self {
            Self::default()
        }

        /// A viewer whose every `show` fails.
        pub fn failing() -> Self {
            Self {
                shown: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        /// Everything shown so far, in order.
        pub fn shown(&self) -> Vec<(SessionId, Option<String>)> {
            self.shown.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }
    }

    impl Viewer for MemoryViewer {
        fn show(&self, session: &SessionId, wire: Option<&str>) -> Result<(), ViewerError> {
            if self.fail {
                return Err(ViewerError("cannot open viewer".into()));
            }
            self.shown
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((session.clone(), wire.map(str::to_owned)));
            Ok(())
        }
    }
}
