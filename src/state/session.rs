//! Session state for the signed-in user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` is the only writer of the two durable session keys. The app
//! hydrates it once at start-up, passes it to the navigation layer, and hands
//! each authorized view the token from its snapshot.
//!
//! INVARIANT
//! =========
//! A session is a token and a user together. Hydration never produces one
//! without the other, and a failed login write clears both keys.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::net::api::SentimentApi;
use crate::net::types::{Session, User};
use crate::util::storage::{DurableStorage, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("user encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("session token is empty")]
    EmptyToken,
}

pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self { storage, current: RwLock::new(None) }
    }

    /// Load the session from durable storage, replacing the in-memory one.
    ///
    /// Returns `None` unless both keys are present and the stored user
    /// decodes.
    pub async fn hydrate(&self) -> Option<Session> {
        let session = read_session(self.storage.as_ref()).await;
        debug!(signed_in = session.is_some(), "session hydrated");
        *self.current.write().await = session.clone();
        session
    }

    /// Snapshot of the in-memory session.
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or either key fails to write.
    /// In that case both keys are cleared and no session is active.
    pub async fn login(&self, token: &str, user: &User) -> Result<Session, SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let user_json = serde_json::to_string(user)?;

        let written = match self.storage.set(TOKEN_KEY, token).await {
            Ok(()) => self.storage.set(USER_KEY, &user_json).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            error!(error = %e, "session write failed; clearing partial session");
            if let Err(cleanup) = self.clear_durable().await {
                error!(error = %cleanup, "session cleanup failed");
            }
            *self.current.write().await = None;
            return Err(e.into());
        }

        let session = Session { token: token.to_owned(), user: user.clone() };
        *self.current.write().await = Some(session.clone());
        info!(email = %user.email, admin = user.is_admin, "session started");
        Ok(session)
    }

    /// Clear the session regardless of prior state.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure. The in-memory session is cleared
    /// either way.
    pub async fn logout(&self) -> Result<(), SessionError> {
        *self.current.write().await = None;
        self.clear_durable().await?;
        info!("session cleared");
        Ok(())
    }

    /// Ask the server who the token belongs to.
    ///
    /// A 401 ends the session. Other failures leave it untouched; a success
    /// refreshes the stored user.
    pub async fn revalidate(&self, api: &dyn SentimentApi) -> Option<Session> {
        let session = self.current().await?;
        match api.current_user(&session.token).await {
            Ok(user) if user == session.user => Some(session),
            Ok(user) => match self.login(&session.token, &user).await {
                Ok(refreshed) => Some(refreshed),
                Err(e) => {
                    warn!(error = %e, "refreshed user could not be stored");
                    None
                }
            },
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "stored session rejected by server");
                if let Err(e) = self.logout().await {
                    error!(error = %e, "logout after rejected session failed");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "session revalidation failed; keeping stored session");
                Some(session)
            }
        }
    }

    async fn clear_durable(&self) -> Result<(), StorageError> {
        let token = self.storage.remove(TOKEN_KEY).await;
        let user = self.storage.remove(USER_KEY).await;
        token.and(user)
    }
}

async fn read_key(storage: &dyn DurableStorage, key: &str) -> Option<String> {
    match storage.get(key).await {
        Ok(Some(value)) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, key, "session key unreadable");
            None
        }
    }
}

async fn read_session(storage: &dyn DurableStorage) -> Option<Session> {
    let token = read_key(storage, TOKEN_KEY).await?;
    let raw_user = read_key(storage, USER_KEY).await?;
    match serde_json::from_str::<User>(&raw_user) {
        Ok(user) => Some(Session { token, user }),
        Err(e) => {
            warn!(error = %e, "stored user is not valid JSON");
            None
        }
    }
}
