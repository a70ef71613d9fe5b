//! End-to-end tests for the engine: JsonAdapter documents driven through
//! the public `Engine` API, with a MemorySink standing in for storage.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use quire_engine::{
    Adapter, AdapterError, Block, BlockDefinition, BlockPatch, Command, CommandContext,
    CommandEffect, Edit, Engine, EngineConfig, EngineError, EventKind, Fields, InsertPosition,
    JsonAdapter, MemorySink, MoveRequest, Plugin, ValidationIssue,
};

// ============================================================================
// Shared test setup
// ============================================================================

/// ```text
/// a "Hello world"
/// q (quote) "quoted"
///   body: n "nested"
/// b "second"
/// ```
const DOC: &str = r#"[
    {"id": "a", "type": "paragraph", "content": {"text": "Hello world"}},
    {"id": "q", "type": "quote", "content": {"text": "quoted"}, "regions": {"body": [
        {"id": "n", "type": "paragraph", "content": {"text": "nested"}}
    ]}},
    {"id": "b", "type": "paragraph", "content": {"text": "second"}}
]"#;

async fn loaded(config: EngineConfig) -> Engine {
    let mut engine = Engine::new(Arc::new(JsonAdapter::new()), config);
    engine.load_document(DOC).await.unwrap();
    engine
}

async fn engine() -> Engine {
    loaded(EngineConfig::default().without_autosave()).await
}

fn root_ids(engine: &Engine) -> Vec<&str> {
    engine.tree().iter().map(|b| b.id.as_str()).collect()
}

fn text(engine: &Engine, id: &str) -> String {
    engine
        .block(id)
        .and_then(|b| b.text_field("text"))
        .unwrap_or_default()
        .to_string()
}

fn kinds(events: &[quire_engine::EditorEvent]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}

// ============================================================================
// Document lifecycle
// ============================================================================

#[tokio::test]
async fn test_load_document_resets_state() {
    let mut engine = engine().await;
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);
    assert!(!engine.can_undo());
    assert!(!engine.is_dirty());

    engine.select("n");
    engine.focus("n");
    engine.update_block("a", BlockPatch::new().content_field("text", "x")).await.unwrap();
    assert!(engine.can_undo());

    let mut loaded = engine.subscribe("document:loaded");
    assert_eq!(engine.load_document(DOC).await.unwrap(), 4);
    assert!(!engine.can_undo());
    assert!(engine.selected().is_empty());
    assert_eq!(engine.focused(), None);
    assert_eq!(text(&engine, "a"), "Hello world");
    assert_eq!(loaded.try_recv().unwrap().data["blocks"], json!(4));
}

#[tokio::test]
async fn test_failed_load_keeps_previous_tree() {
    let mut engine = engine().await;
    let before = engine.tree().to_vec();

    let err = engine.load_document("{not json").await.unwrap_err();
    assert!(matches!(err, EngineError::Adapter(AdapterError::Parse(_))));
    assert_eq!(engine.tree(), before.as_slice());
}

#[tokio::test]
async fn test_save_tracks_dirty_state() {
    let sink = Arc::new(MemorySink::new());
    let mut engine = Engine::new(
        Arc::new(JsonAdapter::new()),
        EngineConfig::default().without_autosave(),
    )
    .with_sink(sink.clone());
    engine.load_document(DOC).await.unwrap();

    engine.update_block("a", BlockPatch::new().content_field("text", "saved")).await.unwrap();
    assert!(engine.is_dirty());

    let document = engine.save().await.unwrap();
    assert!(document.contains("saved"));
    assert_eq!(sink.write_count().await, 1);
    assert!(!engine.is_dirty());

    engine.update_block("a", BlockPatch::new().content_field("text", "later")).await.unwrap();
    assert!(engine.is_dirty());
    engine.undo().unwrap();
    assert!(!engine.is_dirty());
}

#[tokio::test]
async fn test_validate_document_reports_issues() {
    let mut engine = engine().await;
    assert!(engine.validate_document().await.is_empty());

    let image = Block::with_id("img", "image");
    engine.insert_block(image, None).await.unwrap();

    let issues = engine.validate_document().await;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].block_id, "img");
    assert_eq!(issues[0].field.as_deref(), Some("src"));
    assert!(engine.validate_block("missing").await.is_none());
}

// ============================================================================
// Block operations and history
// ============================================================================

#[tokio::test]
async fn test_edit_cycle_undoes_to_original() {
    let mut engine = engine().await;
    let original = engine.tree().to_vec();

    let mut initial = Fields::new();
    initial.insert("text".into(), json!("new"));
    let created = engine
        .create_block("paragraph", Some(initial), Some(InsertPosition::after("a")))
        .await
        .unwrap();
    assert_eq!(engine.tree()[1].id, created.id);

    assert!(engine
        .update_block(&created.id, BlockPatch::new().content_field("text", "edited"))
        .await
        .unwrap());
    assert_eq!(text(&engine, &created.id), "edited");

    assert!(engine.move_block(MoveRequest::new(&created.id, Some(InsertPosition::inside("q", "body")))).await.unwrap());
    assert_eq!(engine.block("q").unwrap().children("body").len(), 2);

    assert!(engine.delete_block("q").await.unwrap());
    assert!(engine.block(&created.id).is_none());

    let after_edits = engine.tree().to_vec();
    for _ in 0..4 {
        assert!(engine.undo().unwrap());
    }
    assert!(!engine.undo().unwrap());
    assert_eq!(engine.tree(), original.as_slice());

    for _ in 0..4 {
        assert!(engine.redo().unwrap());
    }
    assert_eq!(engine.tree(), after_edits.as_slice());
}

#[tokio::test]
async fn test_undo_of_first_child_serializes_like_before() {
    let mut engine = Engine::new(Arc::new(JsonAdapter::new()), EngineConfig::default().without_autosave());
    engine
        .load_document(r#"[{"id": "a", "type": "paragraph", "content": {"text": "x"}}]"#)
        .await
        .unwrap();
    let before = engine.serialize().await.unwrap();

    engine
        .insert_block(Block::with_id("c", "paragraph"), Some(InsertPosition::inside("a", "body")))
        .await
        .unwrap();
    assert!(engine.serialize().await.unwrap().contains("\"body\""));

    assert!(engine.undo().unwrap());
    assert_eq!(engine.serialize().await.unwrap(), before);
}

#[tokio::test]
async fn test_noop_operations_do_not_commit() {
    let mut engine = engine().await;
    assert!(!engine.update_block("missing", BlockPatch::new()).await.unwrap());
    assert!(!engine.delete_block("missing").await.unwrap());
    assert!(!engine.move_block(MoveRequest::to_root_end("missing")).await.unwrap());
    // Into its own subtree.
    assert!(!engine.move_block(MoveRequest::new("q", Some(InsertPosition::after("n")))).await.unwrap());
    assert!(engine.duplicate_block("missing", None).await.unwrap().is_none());
    assert!(!engine.can_undo());
}

#[tokio::test]
async fn test_new_commit_clears_redo() {
    let mut engine = engine().await;
    engine.delete_block("a").await.unwrap();
    engine.undo().unwrap();
    assert!(engine.can_redo());

    engine.delete_block("b").await.unwrap();
    assert!(!engine.can_redo());
}

#[tokio::test]
async fn test_split_then_merge() {
    let mut engine = engine().await;
    let original = engine.tree().to_vec();

    let new_id = engine.split_block("a", 5, None).await.unwrap().unwrap();
    assert_eq!(root_ids(&engine), vec!["a", new_id.as_str(), "q", "b"]);
    assert_eq!(text(&engine, "a"), "Hello");
    assert_eq!(text(&engine, &new_id), " world");

    assert!(engine.merge_blocks("a", &new_id, None).await.unwrap());
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);
    assert_eq!(text(&engine, "a"), "Hello world");

    engine.undo().unwrap();
    assert_eq!(text(&engine, &new_id), " world");
    engine.undo().unwrap();
    assert_eq!(engine.tree(), original.as_slice());
}

#[tokio::test]
async fn test_merge_rejects_mismatched_types() {
    let mut engine = engine().await;
    let err = engine.merge_blocks("a", "q", None).await.unwrap_err();
    assert!(matches!(err, EngineError::Tree(_)));
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);
    assert!(!engine.merge_blocks("a", "missing", None).await.unwrap());
    assert!(!engine.merge_blocks("a", "a", None).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_gets_fresh_ids() {
    let mut engine = engine().await;
    let clone_id = engine.duplicate_block("q", None).await.unwrap().unwrap();
    assert_eq!(engine.tree()[2].id, clone_id);

    let clone = engine.block(&clone_id).unwrap();
    let child = &clone.children("body")[0];
    assert_ne!(child.id, "n");
    assert_eq!(child.text_field("text"), Some("nested"));
}

#[tokio::test]
async fn test_convert_checks_regions() {
    let mut engine = engine().await;

    let err = engine.convert_block("q", "paragraph", None).await.unwrap_err();
    assert!(matches!(err, EngineError::IncompatibleConversion { .. }));
    assert_eq!(engine.block("q").unwrap().block_type, "quote");

    assert!(engine.convert_block("a", "heading", None).await.unwrap());
    assert_eq!(engine.block("a").unwrap().block_type, "heading");

    // Unknown target types are the host's business.
    assert!(engine.convert_block("q", "callout", None).await.unwrap());
    assert!(!engine.convert_block("missing", "heading", None).await.unwrap());
}

// ============================================================================
// Events, selection and focus
// ============================================================================

#[tokio::test]
async fn test_block_events_follow_operations() {
    let mut engine = engine().await;
    let mut blocks = engine.subscribe("block:*");
    let mut history = engine.subscribe("history:>");

    engine.update_block("a", BlockPatch::new().content_field("text", "x")).await.unwrap();
    engine.delete_block("q").await.unwrap();
    engine.undo().unwrap();

    let events = blocks.drain();
    assert_eq!(kinds(&events), vec![EventKind::BlockUpdated, EventKind::BlockDeleted]);
    assert_eq!(events[1].block_id.as_deref(), Some("q"));
    assert_eq!(events[1].data["removed"], json!(["q", "n"]));

    let undo = history.try_recv().unwrap();
    assert_eq!(undo.kind, EventKind::HistoryUndo);
    assert_eq!(undo.data["canRedo"], json!(true));
}

#[tokio::test]
async fn test_delete_prunes_selection_and_focus() {
    let mut engine = engine().await;
    assert!(engine.select("n"));
    assert!(engine.select("b"));
    assert!(engine.focus("n"));
    assert!(!engine.select("missing"));
    assert!(!engine.focus("missing"));

    let mut selection = engine.subscribe("selection:changed");
    let mut focus = engine.subscribe("focus:changed");
    engine.delete_block("q").await.unwrap();

    assert_eq!(engine.selected().iter().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(engine.focused(), None);
    assert_eq!(selection.try_recv().unwrap().data["selected"], json!(["b"]));
    assert_eq!(focus.try_recv().unwrap().data["focused"], json!(null));
}

// ============================================================================
// Plugins
// ============================================================================

/// Stamps created blocks and refuses to delete `a`.
struct Guard {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Plugin for Guard {
    fn id(&self) -> &str {
        "guard"
    }

    async fn on_editor_unmount(&self) -> anyhow::Result<()> {
        self.log.lock().unwrap().push("guard".into());
        Ok(())
    }

    async fn on_block_create(&self, block: Block) -> anyhow::Result<Block> {
        Ok(block.config_field("stamped", true))
    }

    async fn on_block_delete(&self, block: &Block) -> anyhow::Result<()> {
        if block.id == "a" {
            anyhow::bail!("a is protected");
        }
        Ok(())
    }
}

struct Tracker {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Plugin for Tracker {
    fn id(&self) -> &str {
        "tracker"
    }

    async fn on_editor_unmount(&self) -> anyhow::Result<()> {
        self.log.lock().unwrap().push("tracker".into());
        Ok(())
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![Arc::new(ClearDocument)]
    }
}

struct Broken;

#[async_trait]
impl Plugin for Broken {
    fn id(&self) -> &str {
        "broken"
    }

    async fn on_editor_mount(&self) -> anyhow::Result<()> {
        anyhow::bail!("cannot mount")
    }
}

/// Deletes every root block.
struct ClearDocument;

#[async_trait]
impl Command for ClearDocument {
    fn id(&self) -> &str {
        "clear-document"
    }

    fn label(&self) -> &str {
        "Clear document"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        let edits = ctx
            .tree
            .iter()
            .map(|b| Edit::Delete { block_id: b.id.clone() })
            .collect();
        Ok(CommandEffect::Edits(edits))
    }
}

#[tokio::test]
async fn test_plugin_rejection_leaves_engine_untouched() {
    let mut engine = engine().await;
    let log = Arc::new(Mutex::new(Vec::new()));
    engine.add_plugin(Arc::new(Guard { log })).await.unwrap();
    let mut events = engine.subscribe("block:*");

    let err = engine.delete_block("a").await.unwrap_err();
    match err {
        EngineError::Plugin { plugin, source } => {
            assert_eq!(plugin, "guard");
            assert_eq!(source.to_string(), "a is protected");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);
    assert!(!engine.can_undo());
    assert!(events.drain().is_empty());

    let block = engine.insert_block(Block::with_id("z", "paragraph"), None).await.unwrap();
    assert_eq!(block.config.as_ref().unwrap()["stamped"], json!(true));
    assert_eq!(engine.block("z"), Some(&block));
}

#[tokio::test]
async fn test_plugin_registration() {
    let mut engine = engine().await;
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut plugin_events = engine.subscribe("plugin:*");

    engine.add_plugin(Arc::new(Tracker { log: log.clone() })).await.unwrap();
    assert!(engine.command_ids().contains(&"clear-document"));
    assert!(matches!(
        engine.add_plugin(Arc::new(Tracker { log: log.clone() })).await,
        Err(EngineError::DuplicatePlugin(id)) if id == "tracker"
    ));

    let err = engine.add_plugin(Arc::new(Broken)).await.unwrap_err();
    assert!(matches!(err, EngineError::Plugin { .. }));
    assert_eq!(engine.plugin_ids(), vec!["tracker"]);

    engine.execute_command("clear-document").await.unwrap();
    assert!(engine.tree().is_empty());
    engine.undo().unwrap();
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);

    assert!(engine.remove_plugin("tracker").await);
    assert!(!engine.remove_plugin("tracker").await);
    assert!(!engine.command_ids().contains(&"clear-document"));
    assert_eq!(*log.lock().unwrap(), vec!["tracker"]);

    assert_eq!(
        kinds(&plugin_events.drain()),
        vec![EventKind::PluginAdded, EventKind::PluginRemoved]
    );
}

/// Replaces the built-in undo with a command that does nothing.
struct Shadow;

#[async_trait]
impl Plugin for Shadow {
    fn id(&self) -> &str {
        "shadow"
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![Arc::new(InertUndo)]
    }
}

struct InertUndo;

#[async_trait]
impl Command for InertUndo {
    fn id(&self) -> &str {
        "undo"
    }

    fn label(&self) -> &str {
        "Undo (disabled)"
    }

    async fn execute(&self, _ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        Ok(CommandEffect::None)
    }
}

#[tokio::test]
async fn test_removing_plugin_restores_shadowed_command() {
    let mut engine = engine().await;
    engine.delete_block("a").await.unwrap();

    engine.add_plugin(Arc::new(Shadow)).await.unwrap();
    // The replacement has no shortcut, so Mod+Z is gone with the built-in.
    assert_eq!(engine.command_for_shortcut("Mod+Z"), None);
    engine.execute_command("undo").await.unwrap();
    assert_eq!(root_ids(&engine), vec!["q", "b"]);

    assert!(engine.remove_plugin("shadow").await);
    assert_eq!(engine.command_for_shortcut("Mod+Z"), Some("undo"));
    engine.execute_command("undo").await.unwrap();
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);
}

#[tokio::test]
async fn test_destroy_unmounts_in_reverse_order() {
    let mut engine = engine().await;
    let log = Arc::new(Mutex::new(Vec::new()));
    engine.add_plugin(Arc::new(Guard { log: log.clone() })).await.unwrap();
    engine.add_plugin(Arc::new(Tracker { log: log.clone() })).await.unwrap();
    let mut lifecycle = engine.subscribe("engine:destroyed");

    engine.destroy().await;

    assert_eq!(*log.lock().unwrap(), vec!["tracker", "guard"]);
    assert_eq!(lifecycle.try_recv().unwrap().kind, EventKind::EngineDestroyed);
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_builtin_commands() {
    let mut engine = engine().await;
    let mut executed = engine.subscribe("command:executed");

    engine.select("a");
    engine.select("b");
    engine.execute_command("delete-selected").await.unwrap();
    assert_eq!(root_ids(&engine), vec!["q"]);
    assert!(engine.selected().is_empty());

    // One undo reverts the whole command.
    engine.execute_command("undo").await.unwrap();
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);

    assert!(matches!(
        engine.execute_command("delete-selected").await,
        Err(EngineError::CommandUnavailable(_))
    ));
    assert!(matches!(
        engine.execute_command("nope").await,
        Err(EngineError::UnknownCommand(id)) if id == "nope"
    ));

    assert!(engine.execute_shortcut("mod+a").await.unwrap());
    assert_eq!(engine.selected().len(), 4);
    assert_eq!(engine.command_for_shortcut("Shift+Mod+Z"), Some("redo"));
    assert!(!engine.execute_shortcut("Mod+Q").await.unwrap());

    let events = executed.drain();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].data["command"], json!("delete-selected"));
}

#[tokio::test]
async fn test_batch_is_one_history_entry() {
    let mut engine = engine().await;
    let changed = engine
        .batch(vec![
            Edit::Update {
                block_id: "a".into(),
                patch: BlockPatch::new().content_field("text", "first"),
            },
            Edit::Duplicate { block_id: "a".into(), position: None },
            Edit::Delete { block_id: "missing".into() },
            Edit::Move(MoveRequest::to_root_end("a")),
        ])
        .await
        .unwrap();
    assert!(changed);
    assert_eq!(engine.tree().len(), 4);
    assert_eq!(engine.tree()[3].id, "a");
    assert_eq!(engine.history().undo_len(), 1);

    engine.undo().unwrap();
    assert_eq!(root_ids(&engine), vec!["a", "q", "b"]);
    assert!(!engine.batch(Vec::new()).await.unwrap());
}

/// JsonAdapter plus one adapter-level command.
struct ShoutingAdapter(JsonAdapter);

#[async_trait]
impl Adapter for ShoutingAdapter {
    fn name(&self) -> &str {
        "shouting"
    }

    async fn parse(&self, document: &str) -> Result<Vec<Block>, AdapterError> {
        self.0.parse(document).await
    }

    async fn serialize(&self, blocks: &[Block]) -> Result<String, AdapterError> {
        self.0.serialize(blocks).await
    }

    fn available_blocks(&self) -> Vec<BlockDefinition> {
        self.0.available_blocks()
    }

    fn block_definition(&self, block_type: &str) -> Option<BlockDefinition> {
        self.0.block_definition(block_type)
    }

    async fn create_block(&self, block_type: &str, initial: Option<Fields>) -> Result<Block, AdapterError> {
        self.0.create_block(block_type, initial).await
    }

    async fn validate_block(&self, block: &Block) -> Vec<ValidationIssue> {
        self.0.validate_block(block).await
    }

    async fn execute_command(
        &self,
        command: &str,
        ctx: &CommandContext<'_>,
    ) -> anyhow::Result<Option<CommandEffect>> {
        if command != "shout" {
            return Ok(None);
        }
        let Some(id) = ctx.selection.focused() else {
            anyhow::bail!("nothing focused");
        };
        let text = quire_tree::find_block(ctx.tree, id)
            .and_then(|f| f.block.text_field("text"))
            .unwrap_or_default()
            .to_uppercase();
        Ok(Some(CommandEffect::Edits(vec![Edit::Update {
            block_id: id.to_string(),
            patch: BlockPatch::new().content_field("text", text),
        }])))
    }
}

#[tokio::test]
async fn test_unknown_commands_fall_through_to_adapter() {
    let mut engine = Engine::new(
        Arc::new(ShoutingAdapter(JsonAdapter::new())),
        EngineConfig::default().without_autosave(),
    );
    engine.load_document(DOC).await.unwrap();

    let err = engine.execute_command("shout").await.unwrap_err();
    assert!(matches!(err, EngineError::Command { .. }));

    engine.focus("n");
    engine.execute_command("shout").await.unwrap();
    assert_eq!(text(&engine, "n"), "NESTED");
    assert!(matches!(
        engine.execute_command("whisper").await,
        Err(EngineError::UnknownCommand(_))
    ));
}

// ============================================================================
// Auto-save
// ============================================================================

fn autosaving(sink: Arc<MemorySink>) -> Engine {
    Engine::new(
        Arc::new(JsonAdapter::new()),
        EngineConfig::default().with_autosave_debounce(500),
    )
    .with_sink(sink)
}

#[tokio::test(start_paused = true)]
async fn test_autosave_debounces_commits() {
    let sink = Arc::new(MemorySink::new());
    let mut engine = autosaving(sink.clone());
    engine.load_document(DOC).await.unwrap();
    assert!(!engine.is_autosave_pending());
    let mut saved = engine.subscribe("document:saved");

    engine.update_block("a", BlockPatch::new().content_field("text", "v1")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    engine.update_block("a", BlockPatch::new().content_field("text", "v2")).await.unwrap();
    assert!(engine.is_autosave_pending());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sink.write_count().await, 0);

    let event = saved.recv().await.unwrap();
    assert_eq!(event.data["autosave"], json!(true));
    assert_eq!(sink.write_count().await, 1);
    assert!(sink.last().await.unwrap().contains("v2"));
    assert!(!engine.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn test_manual_save_cancels_pending_autosave() {
    let sink = Arc::new(MemorySink::new());
    let mut engine = autosaving(sink.clone());
    engine.load_document(DOC).await.unwrap();

    engine.delete_block("b").await.unwrap();
    assert!(engine.is_autosave_pending());
    engine.save().await.unwrap();
    assert!(!engine.is_autosave_pending());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(sink.write_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_keeps_pending_autosave() {
    let sink = Arc::new(MemorySink::new());
    let mut engine = autosaving(sink.clone());
    engine.load_document(DOC).await.unwrap();

    engine.update_block("a", BlockPatch::new().content_field("text", "kept")).await.unwrap();
    assert!(engine.load_document("{bad").await.is_err());
    assert!(engine.is_autosave_pending());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(sink.write_count().await, 1);
    assert!(sink.last().await.unwrap().contains("kept"));
}

#[tokio::test(start_paused = true)]
async fn test_autosave_failure_is_an_event() {
    let sink = Arc::new(MemorySink::new());
    sink.set_failing(true);
    let mut engine = autosaving(sink.clone());
    engine.load_document(DOC).await.unwrap();
    let mut failed = engine.subscribe("autosave:failed");

    engine.delete_block("b").await.unwrap();
    let event = failed.recv().await.unwrap();
    assert!(event.data["error"].as_str().unwrap().contains("memory sink is failing"));
    assert!(engine.is_dirty());
    assert!(!engine.is_saving());
}
