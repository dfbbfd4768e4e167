//! Progress messages shown to the user while data loads.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Handle returned by [`StatusSink::notify`]; pass it back to [`StatusSink::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusId(pub u64);

/// Prefix of messages posted through [`StatusSink::error`].
pub const ERROR_TAG: &str = "[ERROR]";

/// Receiver of progress and failure messages.
pub trait StatusSink: Send + Sync {
    /// Show `message`; returns an id to clear it with.
    fn notify(&self, message: &str) -> StatusId;

    /// Remove a message previously posted with [`notify`](Self::notify).
    fn clear(&self, id: StatusId);

    /// Show an error-tagged message. Errors are not cleared automatically.
    fn error(&self, message: &str) -> StatusId {
        self.notify(&format!("{ERROR_TAG} {message}"))
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatus;

impl StatusSink for NoopStatus {
    fn notify(&self, _message: &str) -> StatusId {
        StatusId(0)
    }

    fn clear(&self, _id: StatusId) {}
}

/// Forwards messages to `tracing` (or drops them when the feature is off).
#[derive(Debug, Default)]
pub struct TracingStatus {
    next: std::sync::atomic::AtomicU64,
}

impl StatusSink for TracingStatus {
    fn notify(&self, message: &str) -> StatusId {
        let id = self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
        #[cfg(feature = "tracing")]
        {
            if message.starts_with(ERROR_TAG) {
                tracing::warn!(status_id = id, "{message}");
            } else {
                tracing::info!(status_id = id, "{message}");
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = message;
        StatusId(id)
    }

    fn clear(&self, _id: StatusId) {
        #[cfg(feature = "tracing")]
        tracing::debug!(status_id = _id.0, "status cleared");
    }
}

#[derive(Debug, Default)]
struct BoardState {
    max_id: u64,
    current: Option<u64>,
    queued: BTreeMap<u64, String>,
}

/// In-memory status line with a queue behind it.
///
/// The most recently posted message is visible. Clearing the visible message
/// shows the newest message still queued; clearing any other message only
/// removes it from the queue.
#[derive(Debug, Default)]
pub struct StatusBoard {
    state: Mutex<BoardState>,
}

impl StatusBoard {
    /// Empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible message, if any.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        let st = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        st.current.and_then(|id| st.queued.get(&id).cloned())
    }

    /// Every queued message in posting order.
    #[must_use]
    pub fn queued(&self) -> Vec<String> {
        let st = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        st.queued.values().cloned().collect()
    }
}

impl StatusSink for StatusBoard {
    fn notify(&self, message: &str) -> StatusId {
        let mut st = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        st.max_id += 1;
        let id = st.max_id;
        st.queued.insert(id, message.to_string());
        st.current = Some(id);
        StatusId(id)
    }

    fn clear(&self, id: StatusId) {
        let mut st = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        st.queued.remove(&id.0);
        if st.current == Some(id.0) {
            st.current = st.queued.keys().next_back().copied();
        }
    }
}
