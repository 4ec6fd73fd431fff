//! In-memory session payload store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use visualizer_core::{SessionError, SessionId, SessionStore, SignalDataPayload};

/// Default number of sessions kept before the oldest is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Payloads tagged with the generation of their last store. `order` maps
/// generations back to sessions, oldest first.
#[derive(Debug, Default)]
struct Sessions {
    payloads: HashMap<SessionId, (u64, String)>,
    order: BTreeMap<u64, SessionId>,
    generation: u64,
}

/// Bounded session store holding payloads as serialized JSON.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: Mutex<Sessions>,
    max_sessions: usize,
}

impl MemorySessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.payloads.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Sessions>, SessionError> {
        self.sessions
            .lock()
            .map_err(|_| SessionError::Internal("session store lock poisoned".to_string()))
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session: &SessionId) -> Result<Option<SignalDataPayload>, SessionError> {
        let sessions = self.lock()?;
        sessions
            .payloads
            .get(session)
            .map(|(_, raw)| {
                serde_json::from_str(raw).map_err(|e| SessionError::Serialization(e.to_string()))
            })
            .transpose()
    }

    fn store(&self, session: &SessionId, payload: SignalDataPayload) -> Result<(), SessionError> {
        let raw =
            serde_json::to_string(&payload).map_err(|e| SessionError::Serialization(e.to_string()))?;
        let mut sessions = self.lock()?;

        sessions.generation += 1;
        let generation = sessions.generation;
        if let Some((previous, _)) = sessions.payloads.insert(*session, (generation, raw)) {
            sessions.order.remove(&previous);
        }
        sessions.order.insert(generation, *session);

        while sessions.order.len() > self.max_sessions {
            if let Some((_, evicted)) = sessions.order.pop_first() {
                sessions.payloads.remove(&evicted);
                debug!(session = %evicted, "Session evicted");
            }
        }
        Ok(())
    }

    fn discard(&self, session: &SessionId) -> Result<(), SessionError> {
        let mut sessions = self.lock()?;
        if let Some((generation, _)) = sessions.payloads.remove(session) {
            sessions.order.remove(&generation);
        }
        Ok(())
    }
}
