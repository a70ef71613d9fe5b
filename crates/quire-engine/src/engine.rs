//! The engine controller.
//!
//! One [`Engine`] owns one open document. Every mutating call runs the same
//! pipeline:
//!
//! 1. plugin hooks for the operation kind, in order (any may reject)
//! 2. the pure tree operation from `quire_tree::ops`
//! 3. [`History::commit`], which refuses duplicate ids
//! 4. auto-save is rescheduled
//! 5. events are published
//!
//! Mutators take `&mut self`, so calls on one engine never interleave. An
//! error at any step leaves the engine exactly as it was.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::json;

use quire_tree::{Found, History, contains_block, count_blocks, find_block, ops, validate_tree, walk};
use quire_types::{Block, BlockPatch, Fields, InsertPosition, MoveRequest};

use crate::adapter::{Adapter, ValidationIssue};
use crate::autosave::{AutoSaver, SavePipeline, SaveState};
use crate::commands::{Command, CommandContext, CommandEffect, CommandRegistry, Edit};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{EditorEvent, EventBus, EventKind, Subscription};
use crate::plugin::{Plugin, PluginChain};
use crate::selection::Selection;
use crate::sink::DocumentSink;

/// Editing engine for one document.
pub struct Engine {
    adapter: Arc<dyn Adapter>,
    sink: Option<Arc<dyn DocumentSink>>,
    config: EngineConfig,
    history: History,
    selection: Selection,
    plugins: PluginChain,
    /// Commands contributed by each plugin.
    plugin_commands: HashMap<String, Vec<Contributed>>,
    commands: CommandRegistry,
    bus: EventBus,
    autosave: AutoSaver,
    save_state: Arc<SaveState>,
    /// Bumped on every change to the tree.
    revision: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("adapter", &self.adapter.name())
            .field("blocks", &count_blocks(self.history.tree()))
            .field("revision", &self.revision)
            .field("plugins", &self.plugins)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine with an empty document and the built-in commands.
    pub fn new(adapter: Arc<dyn Adapter>, config: EngineConfig) -> Self {
        Self {
            adapter,
            sink: None,
            history: History::new(Vec::new(), config.history.limit),
            selection: Selection::new(),
            plugins: PluginChain::new(),
            plugin_commands: HashMap::new(),
            commands: CommandRegistry::with_builtins(),
            bus: EventBus::new(config.events.capacity),
            autosave: AutoSaver::new(config.autosave.enabled, config.debounce()),
            save_state: Arc::new(SaveState::default()),
            revision: 0,
            config,
        }
    }

    /// Persist saves (manual and automatic) through `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DocumentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn tree(&self) -> &[Block] {
        self.history.tree()
    }

    pub fn find_block(&self, id: &str) -> Option<Found<'_>> {
        find_block(self.history.tree(), id)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.find_block(id).map(|found| found.block)
    }

    pub fn contains(&self, id: &str) -> bool {
        contains_block(self.history.tree(), id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True when the tree differs from the last saved state.
    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty() && self.save_state.saved_revision() != self.revision
    }

    /// True while a save (manual or automatic) is writing.
    pub fn is_saving(&self) -> bool {
        self.save_state.is_saving()
    }

    pub fn is_autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        self.selection.selected()
    }

    pub fn focused(&self) -> Option<&str> {
        self.selection.focused()
    }

    pub fn subscribe(&self, pattern: &str) -> Subscription {
        self.bus.subscribe(pattern)
    }

    // ========================================================================
    // Document
    // ========================================================================

    /// Replace the tree with a parsed document. Clears history, selection
    /// and focus. On failure the previous tree is kept.
    pub async fn load_document(&mut self, document: &str) -> Result<usize> {
        let blocks = self.adapter.parse(document).await?;
        let blocks = self.plugins.document_load(blocks).await?;
        validate_tree(&blocks)?;

        // Only a successful load abandons the pending save of the old tree.
        self.autosave.cancel();
        let count = count_blocks(&blocks);
        self.history.reset(blocks);
        self.revision += 1;
        self.save_state.reset(self.revision);

        let selection_changed = self.selection.clear();
        let focus_changed = self.selection.blur();

        tracing::info!(adapter = self.adapter.name(), blocks = count, "document loaded");
        self.bus.publish(EditorEvent::new(
            EventKind::DocumentLoaded,
            json!({ "blocks": count }),
        ));
        self.publish_selection_changes(selection_changed, focus_changed);
        Ok(count)
    }

    /// Save now: save hooks, serialize, write to the sink (if any).
    /// Cancels any pending auto-save. Returns the serialized document.
    pub async fn save(&mut self) -> Result<String> {
        self.autosave.cancel();

        let document = self
            .pipeline()
            .run(self.history.tree().to_vec(), self.revision)
            .await?;
        self.history.mark_saved();

        tracing::info!(revision = self.revision, bytes = document.len(), "document saved");
        self.bus.publish(EditorEvent::new(
            EventKind::DocumentSaved,
            json!({ "autosave": false, "bytes": document.len() }),
        ));
        Ok(document)
    }

    /// Serialize the current tree without saving.
    pub async fn serialize(&self) -> Result<String> {
        Ok(self.adapter.serialize(self.history.tree()).await?)
    }

    /// Validate every block in the tree.
    pub async fn validate_document(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for block in walk(self.history.tree()) {
            issues.extend(self.adapter.validate_block(block).await);
        }
        issues
    }

    /// Validate one block. `None` if it does not exist.
    pub async fn validate_block(&self, id: &str) -> Option<Vec<ValidationIssue>> {
        let block = self.block(id)?;
        Some(self.adapter.validate_block(block).await)
    }

    // ========================================================================
    // Block operations
    // ========================================================================

    /// Ask the adapter for a fresh block and insert it.
    pub async fn create_block(
        &mut self,
        block_type: &str,
        initial: Option<Fields>,
        position: Option<InsertPosition>,
    ) -> Result<Block> {
        let block = self.adapter.create_block(block_type, initial).await?;
        self.insert_block(block, position).await
    }

    /// Insert a block. Returns the block as inserted (after create hooks).
    pub async fn insert_block(
        &mut self,
        block: Block,
        position: Option<InsertPosition>,
    ) -> Result<Block> {
        let block = self.plugins.block_create(block).await?;
        let next = ops::insert_block(self.tree(), block.clone(), position.as_ref());
        self.commit(next, vec![created_event(&block, position.as_ref())])?;
        Ok(block)
    }

    /// Shallow-merge content/config into a block. `Ok(false)` if absent.
    pub async fn update_block(&mut self, id: &str, patch: BlockPatch) -> Result<bool> {
        if !self.contains(id) {
            return Ok(false);
        }
        let patch = self.plugins.block_update(id, patch).await?;
        let next = ops::update_block(self.tree(), id, &patch);
        self.commit(next, vec![updated_event(id, &patch)])
    }

    /// Remove a block and its subtree. `Ok(false)` if absent.
    pub async fn delete_block(&mut self, id: &str) -> Result<bool> {
        let Some(block) = self.block(id).cloned() else {
            return Ok(false);
        };
        self.plugins.block_delete(&block).await?;
        let next = ops::remove_block(self.tree(), id);
        self.commit(next, vec![deleted_event(&block)])
    }

    /// Relocate a block with its subtree. `Ok(false)` if the block is absent
    /// or the move changes nothing.
    pub async fn move_block(&mut self, request: MoveRequest) -> Result<bool> {
        if !self.contains(&request.block_id) {
            return Ok(false);
        }
        let request = self.plugins.block_move(request).await?;
        let next = ops::move_block(self.tree(), &request);
        self.commit(next, vec![moved_event(&request)])
    }

    /// Clone a block's subtree under fresh ids. Returns the clone's id.
    pub async fn duplicate_block(
        &mut self,
        id: &str,
        position: Option<InsertPosition>,
    ) -> Result<Option<String>> {
        let (next, clone_id) = ops::duplicate_block(self.tree(), id, position.as_ref());
        let Some(clone_id) = clone_id else {
            return Ok(None);
        };
        self.commit(next, vec![duplicated_event(id, &clone_id)])?;
        Ok(Some(clone_id))
    }

    /// Split a text field at a character offset. Returns the new sibling's id.
    pub async fn split_block(
        &mut self,
        id: &str,
        split_index: usize,
        field: Option<&str>,
    ) -> Result<Option<String>> {
        let field = field.unwrap_or(self.config.text.default_field.as_str()).to_string();
        let (next, new_id) = ops::split_block(self.tree(), id, split_index, &field)?;
        let Some(new_id) = new_id else {
            return Ok(None);
        };

        let mut events = vec![EditorEvent::for_block(
            EventKind::BlockUpdated,
            id,
            json!({ "split": { "field": field, "index": split_index, "newId": new_id } }),
        )];
        if let Some(found) = find_block(&next, &new_id) {
            events.push(created_event(found.block, Some(&InsertPosition::after(id))));
        }
        self.commit(next, events)?;
        Ok(Some(new_id))
    }

    /// Append `second`'s text to `first` and remove `second`.
    ///
    /// Delete hooks run for the absorbed block. `Ok(false)` if either block
    /// is absent or the merge would change nothing.
    pub async fn merge_blocks(&mut self, first: &str, second: &str, field: Option<&str>) -> Result<bool> {
        let field = field.unwrap_or(self.config.text.default_field.as_str()).to_string();
        let Some(absorbed) = self.block(second).cloned() else {
            return Ok(false);
        };
        let next = ops::merge_blocks(self.tree(), first, second, &field)?;
        if contains_block(&next, second) {
            return Ok(false);
        }

        self.plugins.block_delete(&absorbed).await?;
        let events = vec![
            EditorEvent::for_block(
                EventKind::BlockUpdated,
                first,
                json!({ "merged": second, "field": field }),
            ),
            deleted_event(&absorbed),
        ];
        self.commit(next, events)
    }

    /// Change a block's type, optionally remapping content fields.
    ///
    /// A block with children cannot become a type the adapter defines
    /// without regions. Types the adapter does not know are allowed.
    pub async fn convert_block(
        &mut self,
        id: &str,
        new_type: &str,
        field_mapping: Option<&BTreeMap<String, String>>,
    ) -> Result<bool> {
        let Some(block) = self.block(id) else {
            return Ok(false);
        };
        let old_type = block.block_type.clone();
        if !block.is_leaf()
            && self
                .adapter
                .block_definition(new_type)
                .is_some_and(|def| !def.supports_regions())
        {
            return Err(EngineError::IncompatibleConversion {
                block_id: id.to_string(),
                new_type: new_type.to_string(),
            });
        }

        let next = ops::convert_block(self.tree(), id, new_type, field_mapping);
        self.commit(
            next,
            vec![EditorEvent::for_block(
                EventKind::BlockUpdated,
                id,
                json!({ "convertedFrom": old_type, "type": new_type }),
            )],
        )
    }

    /// Apply several edits as one history entry.
    ///
    /// Edits run in order against the evolving tree, each through its own
    /// hook; edits whose target is gone by then are skipped. Returns
    /// `Ok(false)` if nothing changed.
    pub async fn batch(&mut self, edits: Vec<Edit>) -> Result<bool> {
        let mut tree = self.tree().to_vec();
        let mut events = Vec::new();

        for edit in edits {
            match edit {
                Edit::Insert { block, position } => {
                    let block = self.plugins.block_create(block).await?;
                    tree = ops::insert_block(&tree, block.clone(), position.as_ref());
                    events.push(created_event(&block, position.as_ref()));
                }
                Edit::Update { block_id, patch } => {
                    if !contains_block(&tree, &block_id) {
                        continue;
                    }
                    let patch = self.plugins.block_update(&block_id, patch).await?;
                    tree = ops::update_block(&tree, &block_id, &patch);
                    events.push(updated_event(&block_id, &patch));
                }
                Edit::Delete { block_id } => {
                    let Some(block) = find_block(&tree, &block_id).map(|f| f.block.clone()) else {
                        continue;
                    };
                    self.plugins.block_delete(&block).await?;
                    tree = ops::remove_block(&tree, &block_id);
                    events.push(deleted_event(&block));
                }
                Edit::Move(request) => {
                    if !contains_block(&tree, &request.block_id) {
                        continue;
                    }
                    let request = self.plugins.block_move(request).await?;
                    tree = ops::move_block(&tree, &request);
                    events.push(moved_event(&request));
                }
                Edit::Duplicate { block_id, position } => {
                    let (next, clone_id) = ops::duplicate_block(&tree, &block_id, position.as_ref());
                    if let Some(clone_id) = clone_id {
                        tree = next;
                        events.push(duplicated_event(&block_id, &clone_id));
                    }
                }
            }
        }

        self.commit(tree, events)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Revert the last commit. `Ok(false)` if there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        self.sync_save_point();
        if !self.history.undo()? {
            return Ok(false);
        }
        let event = self.history_event(EventKind::HistoryUndo);
        self.changed(vec![event]);
        Ok(true)
    }

    /// Re-apply the last undone commit. `Ok(false)` if there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        self.sync_save_point();
        if !self.history.redo()? {
            return Ok(false);
        }
        let event = self.history_event(EventKind::HistoryRedo);
        self.changed(vec![event]);
        Ok(true)
    }

    fn history_event(&self, kind: EventKind) -> EditorEvent {
        EditorEvent::new(
            kind,
            json!({ "canUndo": self.can_undo(), "canRedo": self.can_redo() }),
        )
    }

    // ========================================================================
    // Selection and focus
    // ========================================================================

    /// Add a block to the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) || !self.selection.select(id) {
            return false;
        }
        self.publish_selection_changes(true, false);
        true
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        if !self.selection.deselect(id) {
            return false;
        }
        self.publish_selection_changes(true, false);
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if !self.selection.clear() {
            return false;
        }
        self.publish_selection_changes(true, false);
        true
    }

    /// Select every block at every depth.
    pub fn select_all(&mut self) -> bool {
        let all = walk(self.tree()).map(|b| b.id.clone()).collect();
        self.set_selection(all)
    }

    /// Replace the selection; ids not in the tree are dropped.
    pub fn set_selection(&mut self, ids: BTreeSet<String>) -> bool {
        let tree = self.history.tree();
        let ids = ids.into_iter().filter(|id| contains_block(tree, id)).collect();
        if !self.selection.set(ids) {
            return false;
        }
        self.publish_selection_changes(true, false);
        true
    }

    /// Focus a block. Unknown ids are ignored.
    pub fn focus(&mut self, id: &str) -> bool {
        if !self.contains(id) || !self.selection.focus(id) {
            return false;
        }
        self.publish_selection_changes(false, true);
        true
    }

    pub fn blur(&mut self) -> bool {
        if !self.selection.blur() {
            return false;
        }
        self.publish_selection_changes(false, true);
        true
    }

    fn publish_selection_changes(&self, selection: bool, focus: bool) {
        if selection {
            let selected: Vec<&String> = self.selection.selected().iter().collect();
            self.bus.publish(EditorEvent::new(
                EventKind::SelectionChanged,
                json!({ "selected": selected }),
            ));
        }
        if focus {
            self.bus.publish(EditorEvent::new(
                EventKind::FocusChanged,
                json!({ "focused": self.selection.focused() }),
            ));
        }
    }

    // ========================================================================
    // Plugins
    // ========================================================================

    /// Mount and register a plugin along with its commands.
    pub async fn add_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let id = plugin.id().to_string();
        if self.plugins.get(&id).is_some() {
            return Err(EngineError::DuplicatePlugin(id));
        }
        plugin
            .on_editor_mount()
            .await
            .map_err(|e| EngineError::plugin(&id, e))?;

        let mut contributed = Vec::new();
        for command in plugin.commands() {
            let replaced = self.commands.register(Arc::clone(&command));
            if let Some(previous) = &replaced {
                tracing::debug!(plugin = %id, command = previous.id(), "plugin command shadows existing command");
            }
            contributed.push(Contributed { command, replaced });
        }
        self.plugin_commands.insert(id.clone(), contributed);
        self.plugins.add(plugin)?;

        tracing::debug!(plugin = %id, "plugin added");
        self.bus
            .publish(EditorEvent::new(EventKind::PluginAdded, json!({ "plugin": id })));
        Ok(())
    }

    /// Unregister and unmount a plugin. Returns false if it was not registered.
    pub async fn remove_plugin(&mut self, id: &str) -> bool {
        let Some(plugin) = self.plugins.remove(id) else {
            return false;
        };
        // Newest first, so a plugin overriding its own command unwinds cleanly.
        for entry in self.plugin_commands.remove(id).unwrap_or_default().into_iter().rev() {
            let command_id = entry.command.id();
            let installed = self
                .commands
                .get(command_id)
                .is_some_and(|current| Arc::ptr_eq(&current, &entry.command));
            if !installed {
                // Shadowed by a later plugin: whoever displaced us inherits
                // what we displaced.
                if let Some(later) = self
                    .plugin_commands
                    .values_mut()
                    .flatten()
                    .find(|later| later.replaced.as_ref().is_some_and(|r| Arc::ptr_eq(r, &entry.command)))
                {
                    later.replaced = entry.replaced;
                }
                continue;
            }
            self.commands.unregister(command_id);
            if let Some(previous) = entry.replaced {
                self.commands.register(previous);
            }
        }
        if let Err(e) = plugin.on_editor_unmount().await {
            tracing::warn!(plugin = %id, error = %e, "plugin unmount failed");
        }

        tracing::debug!(plugin = %id, "plugin removed");
        self.bus
            .publish(EditorEvent::new(EventKind::PluginRemoved, json!({ "plugin": id })));
        true
    }

    pub fn plugin_ids(&self) -> Vec<&str> {
        self.plugins.ids()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Register a command, replacing one with the same id.
    pub fn register_command(&mut self, command: Arc<dyn Command>) -> Option<Arc<dyn Command>> {
        self.commands.register(command)
    }

    pub fn unregister_command(&mut self, id: &str) -> bool {
        self.commands.unregister(id).is_some()
    }

    pub fn command_ids(&self) -> Vec<&str> {
        self.commands.ids()
    }

    /// Id of the command bound to `shortcut`.
    pub fn command_for_shortcut(&self, shortcut: &str) -> Option<&str> {
        self.commands.for_shortcut(shortcut)
    }

    fn command_context(&self) -> CommandContext<'_> {
        CommandContext {
            tree: self.history.tree(),
            selection: &self.selection,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Run a command by id.
    ///
    /// Ids the registry does not know are offered to the adapter before
    /// failing with `UnknownCommand`.
    pub async fn execute_command(&mut self, id: &str) -> Result<()> {
        let effect = match self.commands.get(id) {
            Some(command) => {
                let ctx = self.command_context();
                if !command.can_execute(&ctx) {
                    return Err(EngineError::CommandUnavailable(id.to_string()));
                }
                command.execute(&ctx).await.map_err(|e| command_failed(id, e))?
            }
            None => {
                let ctx = self.command_context();
                self.adapter
                    .execute_command(id, &ctx)
                    .await
                    .map_err(|e| command_failed(id, e))?
                    .ok_or_else(|| EngineError::UnknownCommand(id.to_string()))?
            }
        };

        match effect {
            CommandEffect::None => {}
            CommandEffect::Edits(edits) => {
                self.batch(edits).await?;
            }
            CommandEffect::Select(ids) => {
                self.set_selection(ids);
            }
            CommandEffect::Undo => {
                self.undo()?;
            }
            CommandEffect::Redo => {
                self.redo()?;
            }
        }

        tracing::debug!(command = id, "command executed");
        self.bus
            .publish(EditorEvent::new(EventKind::CommandExecuted, json!({ "command": id })));
        Ok(())
    }

    /// Run the command bound to `shortcut`. `Ok(false)` if none is bound.
    pub async fn execute_shortcut(&mut self, shortcut: &str) -> Result<bool> {
        let Some(id) = self.command_for_shortcut(shortcut).map(str::to_string) else {
            return Ok(false);
        };
        self.execute_command(&id).await?;
        Ok(true)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shut the engine down: cancel auto-save, unmount plugins (last added
    /// first) and announce `engine:destroyed`.
    pub async fn destroy(mut self) {
        self.autosave.cancel();
        for plugin in self.plugins.iter().rev() {
            if let Err(e) = plugin.on_editor_unmount().await {
                tracing::warn!(plugin = plugin.id(), error = %e, "plugin unmount failed");
            }
        }
        tracing::info!(revision = self.revision, dirty = self.is_dirty(), "engine destroyed");
        self.bus
            .publish(EditorEvent::new(EventKind::EngineDestroyed, json!({})));
    }

    // ========================================================================
    // Commit plumbing
    // ========================================================================

    fn pipeline(&self) -> SavePipeline {
        SavePipeline {
            adapter: Arc::clone(&self.adapter),
            sink: self.sink.clone(),
            plugins: self.plugins.clone(),
            state: Arc::clone(&self.save_state),
        }
    }

    /// Move the history's save point to the current tree if a background
    /// save has caught up with it.
    fn sync_save_point(&mut self) {
        if self.save_state.saved_revision() == self.revision {
            self.history.mark_saved();
        }
    }

    /// Commit `next` and, if it changed anything, publish `events`.
    fn commit(&mut self, next: Vec<Block>, events: Vec<EditorEvent>) -> Result<bool> {
        self.sync_save_point();
        if !self.history.commit(next)? {
            return Ok(false);
        }
        self.changed(events);
        Ok(true)
    }

    /// Bookkeeping after the tree changed.
    fn changed(&mut self, events: Vec<EditorEvent>) {
        self.revision += 1;
        let (selection_changed, focus_changed) =
            self.selection.retain_existing(self.history.tree());

        self.autosave.cancel();
        if self.config.autosave.enabled && self.sink.is_some() {
            let pipeline = self.pipeline();
            self.autosave.schedule(
                pipeline,
                self.bus.clone(),
                self.history.tree().to_vec(),
                self.revision,
            );
        }

        for event in events {
            self.bus.publish(event);
        }
        self.publish_selection_changes(selection_changed, focus_changed);
    }
}

/// A plugin command and whatever it displaced on registration.
struct Contributed {
    command: Arc<dyn Command>,
    replaced: Option<Arc<dyn Command>>,
}

fn command_failed(id: &str, error: anyhow::Error) -> EngineError {
    EngineError::Command {
        command: id.to_string(),
        source: error.into(),
    }
}

// ============================================================================
// Event payloads
// ============================================================================

fn created_event(block: &Block, position: Option<&InsertPosition>) -> EditorEvent {
    EditorEvent::for_block(
        EventKind::BlockCreated,
        &block.id,
        json!({ "block": block, "position": position }),
    )
}

fn updated_event(id: &str, patch: &BlockPatch) -> EditorEvent {
    EditorEvent::for_block(EventKind::BlockUpdated, id, json!({ "patch": patch }))
}

fn deleted_event(block: &Block) -> EditorEvent {
    let removed: Vec<&str> = walk(std::slice::from_ref(block))
        .map(|b| b.id.as_str())
        .collect();
    EditorEvent::for_block(EventKind::BlockDeleted, &block.id, json!({ "removed": removed }))
}

fn moved_event(request: &MoveRequest) -> EditorEvent {
    EditorEvent::for_block(
        EventKind::BlockMoved,
        &request.block_id,
        json!({ "target": request.target }),
    )
}

fn duplicated_event(source: &str, clone_id: &str) -> EditorEvent {
    EditorEvent::for_block(
        EventKind::BlockDuplicated,
        clone_id,
        json!({ "sourceId": source, "cloneId": clone_id }),
    )
}
