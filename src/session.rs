//! Session store: the bearer token and profile snapshot of the signed-in user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Injected into the API client (which reads the token on every call) and
//! into the view flows (which write it after login and profile edits). At
//! most one session exists per origin; writes replace, never merge.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::{MemoryStorage, Storage};
use crate::types::UserProfile;

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";

/// The signed-in user's credential and profile snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Cloneable handle over an origin-scoped [`Storage`].
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// A store backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persist `session`, replacing whatever was stored before.
    ///
    /// Both entries are written in one batch, so a failed save leaves the
    /// previous session intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)?;
        self.storage.set_items(&[(USER_KEY, user.as_str()), (TOKEN_KEY, session.token.as_str())])?;
        tracing::info!(username = %session.user.username, "session saved");
        Ok(())
    }

    /// The current session, or `None` if absent, partial, or unreadable.
    #[must_use]
    pub fn read(&self) -> Option<Session> {
        let token = self.token()?;
        let user = self.profile()?;
        Some(Session { token, user })
    }

    /// Remove all session data for this origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not be emptied.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.clear()?;
        tracing::info!("session cleared");
        Ok(())
    }

    /// Bearer token as of this instant. Read per request so rotation applies immediately.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Stored profile snapshot. Corrupt JSON reads as absent.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.storage.get_item(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "stored profile unreadable; ignoring");
                None
            }
        }
    }

    /// Overwrite only the profile snapshot, keeping the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    pub fn replace_profile(&self, user: &UserProfile) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.storage.set_item(USER_KEY, &raw)?;
        tracing::info!(username = %user.username, "session profile replaced");
        Ok(())
    }
}
