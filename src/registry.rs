//! Sessions keyed by an identifier.
//!
//! For front ends that drive several independent connections. Each
//! operation takes the lock once; a looked-up session is handed out as an
//! `Arc` so no lock is held while it is used.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::client::Session;

/// Owned mapping from session id to [`Session`].
#[derive(Debug)]
pub struct SessionRegistry<K> {
    sessions: Mutex<HashMap<K, Arc<Session>>>,
}

impl<K> Default for SessionRegistry<K> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> SessionRegistry<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` under `id`, returning the session it replaced.
    pub fn insert(&self, id: K, session: Session) -> Option<Arc<Session>> {
        debug!(?id, "session registered");
        self.sessions.lock().insert(id, Arc::new(session))
    }

    pub fn get(&self, id: &K) -> Option<Arc<Session>> {
        self.sessions.lock().get(id).cloned()
    }

    /// Remove the session under `id`. The caller decides whether to disconnect it.
    pub fn remove(&self, id: &K) -> Option<Arc<Session>> {
        let removed = self.sessions.lock().remove(id);
        if removed.is_some() {
            debug!(?id, "session removed");
        }
        removed
    }

    pub fn contains(&self, id: &K) -> bool {
        self.sessions.lock().contains_key(id)
    }

    pub fn ids(&self) -> Vec<K> {
        self.sessions.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Remove every session and disconnect each one.
    pub async fn shutdown_all(&self) {
        let sessions: Vec<_> = self.sessions.lock().drain().collect();
        for (id, session) in sessions {
            if let Err(e) = session.disconnect().await {
                debug!(?id, error = %e, "disconnect failed during shutdown");
            }
        }
    }
}
