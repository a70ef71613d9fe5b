//! Debounced auto-save.
//!
//! Every commit reschedules a single background task: the pending timer is
//! aborted and a new one started. When the timer fires, the snapshot it was
//! given is run through the save hooks, serialized by the adapter and written
//! to the sink. Nobody awaits this task, so failures become
//! `autosave:failed` events.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;

use quire_types::Block;

use crate::adapter::Adapter;
use crate::error::{EngineError, Result};
use crate::events::{EditorEvent, EventBus, EventKind};
use crate::plugin::PluginChain;
use crate::sink::DocumentSink;

/// Save bookkeeping shared between the engine and its background task.
#[derive(Debug, Default)]
pub(crate) struct SaveState {
    /// Revision of the tree most recently written by any save.
    saved_revision: AtomicU64,
    saving: AtomicBool,
}

impl SaveState {
    pub(crate) fn saved_revision(&self) -> u64 {
        self.saved_revision.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_saved(&self, revision: u64) {
        self.saved_revision.fetch_max(revision, Ordering::SeqCst);
    }

    pub(crate) fn reset(&self, revision: u64) {
        self.saved_revision.store(revision, Ordering::SeqCst);
    }

    pub(crate) fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }
}

/// Everything one save needs, cloneable into a task.
#[derive(Clone)]
pub(crate) struct SavePipeline {
    pub adapter: Arc<dyn Adapter>,
    pub sink: Option<Arc<dyn DocumentSink>>,
    pub plugins: PluginChain,
    pub state: Arc<SaveState>,
}

impl SavePipeline {
    /// Save hooks → serialize → sink. Returns the serialized document.
    pub(crate) async fn run(&self, tree: Vec<Block>, revision: u64) -> Result<String> {
        let _saving = SavingFlag::raise(&self.state.saving);
        let document = self.write(tree).await?;
        self.state.mark_saved(revision);
        Ok(document)
    }

    async fn write(&self, tree: Vec<Block>) -> Result<String> {
        let tree = self.plugins.document_save(tree).await?;
        let document = self.adapter.serialize(&tree).await?;
        if let Some(sink) = &self.sink {
            sink.write(&document)
                .await
                .map_err(|e| EngineError::Sink(e.into()))?;
        }
        Ok(document)
    }
}

/// Holds `saving` up until dropped, including when the task is aborted.
struct SavingFlag<'a>(&'a AtomicBool);

impl<'a> SavingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owner of the pending auto-save timer.
pub(crate) struct AutoSaver {
    enabled: bool,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl AutoSaver {
    pub(crate) fn new(enabled: bool, debounce: Duration) -> Self {
        Self {
            enabled,
            debounce,
            pending: None,
        }
    }

    /// Cancel any pending save and start a new timer for `tree`.
    pub(crate) fn schedule(
        &mut self,
        pipeline: SavePipeline,
        bus: EventBus,
        tree: Vec<Block>,
        revision: u64,
    ) {
        self.cancel();
        if !self.enabled || pipeline.sink.is_none() {
            return;
        }

        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            match pipeline.run(tree, revision).await {
                Ok(document) => {
                    tracing::debug!(revision, bytes = document.len(), "autosaved");
                    bus.publish(EditorEvent::new(
                        EventKind::DocumentSaved,
                        json!({ "autosave": true, "bytes": document.len() }),
                    ));
                }
                Err(e) => {
                    tracing::warn!(revision, error = %e, "autosave failed");
                    bus.publish(EditorEvent::new(
                        EventKind::AutosaveFailed,
                        json!({ "error": e.to_string() }),
                    ));
                }
            }
        }));
    }

    /// Abort the pending timer. Returns true if one was pending.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}
