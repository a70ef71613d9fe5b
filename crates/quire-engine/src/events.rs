//! Editor event bus.
//!
//! Every engine operation that changes something publishes one or more
//! [`EditorEvent`]s. Subscribers filter by subject pattern; subjects are
//! colon-separated tokens such as `block:created` or `history:undo`.
//!
//! # Pattern Matching
//!
//! - `*` matches exactly one token: `block:*` matches `block:moved`
//! - `>` matches one or more tokens (only at end): `>` matches everything
//! - anything else matches literally
//!
//! Delivery happens at publish time into each subscriber's buffer. A
//! subscriber that falls more than `capacity` events behind loses the oldest
//! ones and logs a warning.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use tokio::sync::broadcast;

use quire_types::now_millis;

// ============================================================================
// Pattern Matching
// ============================================================================

/// Check if a subject matches a pattern.
pub fn matches_pattern(pattern: &str, subject: &str) -> bool {
    let pattern_tokens: Vec<&str> = pattern.split(':').collect();
    let subject_tokens: Vec<&str> = subject.split(':').collect();

    let mut pi = 0;
    let mut si = 0;

    while pi < pattern_tokens.len() && si < subject_tokens.len() {
        match pattern_tokens[pi] {
            ">" => return pi == pattern_tokens.len() - 1,
            "*" => {
                pi += 1;
                si += 1;
            }
            token => {
                if token != subject_tokens[si] {
                    return false;
                }
                pi += 1;
                si += 1;
            }
        }
    }

    pi == pattern_tokens.len() && si == subject_tokens.len()
}

// ============================================================================
// Events
// ============================================================================

/// Every kind of event the engine emits.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum EventKind {
    #[serde(rename = "block:created")]
    #[strum(serialize = "block:created")]
    BlockCreated,
    #[serde(rename = "block:updated")]
    #[strum(serialize = "block:updated")]
    BlockUpdated,
    #[serde(rename = "block:deleted")]
    #[strum(serialize = "block:deleted")]
    BlockDeleted,
    #[serde(rename = "block:moved")]
    #[strum(serialize = "block:moved")]
    BlockMoved,
    #[serde(rename = "block:duplicated")]
    #[strum(serialize = "block:duplicated")]
    BlockDuplicated,
    #[serde(rename = "history:undo")]
    #[strum(serialize = "history:undo")]
    HistoryUndo,
    #[serde(rename = "history:redo")]
    #[strum(serialize = "history:redo")]
    HistoryRedo,
    #[serde(rename = "selection:changed")]
    #[strum(serialize = "selection:changed")]
    SelectionChanged,
    #[serde(rename = "focus:changed")]
    #[strum(serialize = "focus:changed")]
    FocusChanged,
    #[serde(rename = "document:loaded")]
    #[strum(serialize = "document:loaded")]
    DocumentLoaded,
    #[serde(rename = "document:saved")]
    #[strum(serialize = "document:saved")]
    DocumentSaved,
    #[serde(rename = "autosave:failed")]
    #[strum(serialize = "autosave:failed")]
    AutosaveFailed,
    #[serde(rename = "plugin:added")]
    #[strum(serialize = "plugin:added")]
    PluginAdded,
    #[serde(rename = "plugin:removed")]
    #[strum(serialize = "plugin:removed")]
    PluginRemoved,
    #[serde(rename = "command:executed")]
    #[strum(serialize = "command:executed")]
    CommandExecuted,
    #[serde(rename = "engine:destroyed")]
    #[strum(serialize = "engine:destroyed")]
    EngineDestroyed,
}

impl EventKind {
    /// The subject string used for pattern matching.
    pub fn subject(&self) -> &str {
        self.as_ref()
    }
}

/// One published event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: Value,
    /// Unix millis at emit time.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
}

impl EditorEvent {
    pub fn new(kind: EventKind, data: Value) -> Self {
        Self {
            kind,
            data,
            timestamp: now_millis(),
            block_id: None,
        }
    }

    pub fn for_block(kind: EventKind, block_id: impl Into<String>, data: Value) -> Self {
        Self {
            block_id: Some(block_id.into()),
            ..Self::new(kind, data)
        }
    }

    pub fn subject(&self) -> &str {
        self.kind.subject()
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// Broadcast channel of editor events. Cheap to clone; clones share the
/// channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EditorEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus; a capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish an event. Returns the number of subscribers that buffered it.
    pub fn publish(&self, event: EditorEvent) -> usize {
        tracing::trace!(subject = event.subject(), block = ?event.block_id, "event");
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events whose subject matches `pattern`.
    pub fn subscribe(&self, pattern: &str) -> Subscription {
        Subscription {
            pattern: pattern.to_string(),
            rx: self.tx.subscribe(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// A pattern-filtered view of the bus.
pub struct Subscription {
    pattern: String,
    rx: broadcast::Receiver<EditorEvent>,
}

impl Subscription {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Receive the next matching event, waiting if necessary.
    ///
    /// Returns None once the engine is gone and the buffer is drained.
    pub async fn recv(&mut self) -> Option<EditorEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if matches_pattern(&self.pattern, event.subject()) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(pattern = %self.pattern, lagged = n, "event subscription lagged behind");
                }
            }
        }
    }

    /// Receive the next buffered matching event without waiting.
    pub fn try_recv(&mut self) -> Option<EditorEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if matches_pattern(&self.pattern, event.subject()) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Closed) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(pattern = %self.pattern, lagged = n, "event subscription lagged behind");
                }
            }
        }
    }

    /// Drain every buffered matching event.
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}
