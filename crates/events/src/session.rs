use std::collections::HashMap;

use depot_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

use crate::message::SessionMessage;

/// Channel sender half for pushing messages to a live session.
pub type SessionSender = mpsc::UnboundedSender<SessionMessage>;

/// Receiver half, drained by the connection's writer task.
pub type SessionReceiver = mpsc::UnboundedReceiver<SessionMessage>;

/// Identity of one connection. A user who reconnects gets a new id.
pub type SessionId = uuid::Uuid;

/// A clonable handle to a registered session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub session_id: SessionId,
    pub user_id: DbId,
    pub sender: SessionSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

impl SessionHandle {
    /// A session is live while its writer task still holds the receiver.
    pub fn is_live(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[derive(Default)]
struct Sessions {
    by_user: HashMap<DbId, SessionHandle>,
    owners: HashMap<SessionId, DbId>,
}

impl Sessions {
    fn remove_session(&mut self, session_id: SessionId) -> Option<DbId> {
        let user_id = self.owners.remove(&session_id)?;
        // A newer connection for the same user may already have replaced
        // this one; only drop the user's entry if it is still ours.
        if self
            .by_user
            .get(&user_id)
            .is_some_and(|h| h.session_id == session_id)
        {
            self.by_user.remove(&user_id);
        }
        Some(user_id)
    }
}

/// Process-wide map from user id to that user's live session.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared by every connection task and by the notifier. Sends never block:
/// each session has an unbounded queue drained by its own writer task.
pub struct SessionRegistry {
    sessions: RwLock<Sessions>,
}

impl SessionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
        }
    }

    /// Register a session for `user_id`.
    ///
    /// Last connect wins: a previous session for the same user is dropped
    /// from the registry along with its sender, which ends that session's
    /// queue. Its writer task then sees the end of the queue and closes the
    /// socket.
    /// Returns the new session id and the receiver the caller must forward
    /// to the socket.
    pub async fn register(&self, user_id: DbId) -> (SessionId, SessionReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            session_id: uuid::Uuid::new_v4(),
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        let session_id = handle.session_id;

        let mut sessions = self.sessions.write().await;
        if let Some(previous) = sessions.by_user.insert(user_id, handle) {
            sessions.owners.remove(&previous.session_id);
            tracing::debug!(
                user_id,
                replaced = %previous.session_id,
                "Session replaced by newer connection"
            );
        }
        sessions.owners.insert(session_id, user_id);
        tracing::info!(user_id, session_id = %session_id, "Session registered");
        (session_id, rx)
    }

    /// Remove a session by its id. Returns the owning user, if the session
    /// was known. Unknown ids are a no-op.
    pub async fn unregister(&self, session_id: SessionId) -> Option<DbId> {
        let user_id = self.sessions.write().await.remove_session(session_id);
        if let Some(user_id) = user_id {
            tracing::info!(user_id, session_id = %session_id, "Session unregistered");
        }
        user_id
    }

    /// The current session for a user.
    pub async fn get(&self, user_id: DbId) -> Option<SessionHandle> {
        self.sessions.read().await.by_user.get(&user_id).cloned()
    }

    /// Whether the user has a registered session whose writer is still alive.
    pub async fn is_online(&self, user_id: DbId) -> bool {
        self.sessions
            .read()
            .await
            .by_user
            .get(&user_id)
            .is_some_and(SessionHandle::is_live)
    }

    /// Number of registered sessions (one per user at most).
    pub async fn count(&self) -> usize {
        self.sessions.read().await.by_user.len()
    }

    /// Forget every session without notifying anyone.
    pub async fn clear(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.by_user.clear();
        sessions.owners.clear();
    }

    /// Queue a message for a user's session.
    ///
    /// Returns `false` if the user is offline. A failed send means the
    /// writer task is gone, so the session is unregistered on the spot.
    pub async fn send_to_user(&self, user_id: DbId, message: SessionMessage) -> bool {
        let Some(handle) = self.get(user_id).await else {
            return false;
        };

        match handle.sender.send(message) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    user_id,
                    session_id = %handle.session_id,
                    "Send to session failed, unregistering"
                );
                self.unregister(handle.session_id).await;
                false
            }
        }
    }

    /// Queue a message for every session. Returns the number delivered.
    pub async fn broadcast(&self, message: SessionMessage) -> usize {
        let handles: Vec<SessionHandle> =
            self.sessions.read().await.by_user.values().cloned().collect();

        let mut delivered = 0;
        for handle in handles {
            if handle.sender.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                self.unregister(handle.session_id).await;
            }
        }
        delivered
    }

    /// Send a Ping to every session, pruning the ones that are gone.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) -> usize {
        self.broadcast(SessionMessage::Ping).await
    }

    /// Send Close to every session, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.by_user.len();
        for handle in sessions.by_user.values() {
            let _ = handle.sender.send(SessionMessage::Close);
        }
        sessions.by_user.clear();
        sessions.owners.clear();
        tracing::info!(count, "Closed all sessions");
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
