//! Session payload storage trait.

use crate::error::SessionError;
use crate::types::{SessionId, SignalDataPayload};

/// Get/set of the editor payload scoped to one session.
///
/// Each session has a single writer at a time.
pub trait SessionStore: Send + Sync {
    /// The stored payload, `None` for a session that never stored one.
    fn load(&self, session: &SessionId) -> Result<Option<SignalDataPayload>, SessionError>;

    fn store(&self, session: &SessionId, payload: SignalDataPayload) -> Result<(), SessionError>;

    /// Forget a session.
    fn discard(&self, session: &SessionId) -> Result<(), SessionError>;

    /// The stored payload or an empty one.
    fn load_or_default(&self, session: &SessionId) -> Result<SignalDataPayload, SessionError> {
        Ok(self.load(session)?.unwrap_or_default())
    }
}
