//! Per-session fan-out of feedback events to connected viewers.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Buffered messages per viewer before the publisher starts dropping.
pub const SEND_QUEUE: usize = 64;

/// One connected viewer: an id plus the sending half of its outbound queue.
///
/// The queue is drained by the viewer's WebSocket writer task; the registry
/// never blocks on it.
#[derive(Debug, Clone)]
pub struct ViewerHandle {
    pub id: String,
    tx: mpsc::Sender<Arc<String>>,
}

impl ViewerHandle {
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self { id, tx }
    }
}

/// In-memory map of session id → connected viewers.
///
/// `join`/`leave`/`publish` on one session are linearized by the lock; there
/// is no cross-session ordering and none is needed. Lifetime is the process
/// lifetime; nothing here is persisted.
pub struct ViewerRegistry {
    sessions: RwLock<HashMap<String, HashMap<String, ViewerHandle>>>,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Add a viewer to a session, creating the viewer set if absent.
    pub async fn join(&self, session_id: &str, handle: ViewerHandle) {
        let mut sessions = self.sessions.write().await;
        let viewers = sessions.entry(session_id.to_string()).or_default();
        debug!(session_id, viewer = %handle.id, "viewer joined");
        viewers.insert(handle.id.clone(), handle);
    }

    /// Remove a viewer from a session. Removing an absent viewer is a no-op.
    /// An emptied viewer set is dropped entirely.
    pub async fn leave(&self, session_id: &str, viewer_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(viewers) = sessions.get_mut(session_id) {
            if viewers.remove(viewer_id).is_some() {
                debug!(session_id, viewer = viewer_id, "viewer left");
            }
            if viewers.is_empty() {
                sessions.remove(session_id);
            }
        }
    }

    /// Serialize `message` once and deliver it to every viewer of the
    /// session. A session with no viewers is a silent no-op. A viewer whose
    /// channel has closed is evicted as a side effect; a viewer whose queue
    /// is merely full loses this message but stays registered.
    pub async fn publish<T: Serialize>(&self, session_id: &str, message: &T) {
        let json = match serde_json::to_string(message) {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(session_id, error = %e, "failed to serialize outbound message");
                return;
            }
        };

        let mut stale = Vec::new();
        {
            let sessions = self.sessions.read().await;
            let Some(viewers) = sessions.get(session_id) else {
                return;
            };
            for viewer in viewers.values() {
                match viewer.tx.try_send(Arc::clone(&json)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(session_id, viewer = %viewer.id, "viewer queue full, dropping message");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        stale.push(viewer.id.clone());
                    }
                }
            }
        }

        for viewer_id in stale {
            warn!(session_id, viewer = %viewer_id, "evicting disconnected viewer");
            self.leave(session_id, &viewer_id).await;
        }
    }

    /// Number of viewers currently connected to a session.
    pub async fn viewer_count(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map_or(0, HashMap::len)
    }
}

impl Default for ViewerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
