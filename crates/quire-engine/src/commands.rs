//! Named commands and shortcuts.
//!
//! A command inspects a read-only [`CommandContext`] and returns a
//! [`CommandEffect`] for the engine to carry out. Edits returned by one
//! command are applied as a single history entry, so one undo reverts the
//! whole command.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use quire_tree::walk;
use quire_types::{Block, BlockPatch, InsertPosition, MoveRequest};

use crate::selection::Selection;

/// What a command sees.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub tree: &'a [Block],
    pub selection: &'a Selection,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// One primitive edit. Each goes through the same plugin hook as the
/// matching engine operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert {
        block: Block,
        position: Option<InsertPosition>,
    },
    Update {
        block_id: String,
        patch: BlockPatch,
    },
    Delete {
        block_id: String,
    },
    Move(MoveRequest),
    Duplicate {
        block_id: String,
        position: Option<InsertPosition>,
    },
}

/// What the engine should do after a command runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CommandEffect {
    #[default]
    None,
    /// Apply edits in order, committed together.
    Edits(Vec<Edit>),
    /// Replace the selection.
    Select(BTreeSet<String>),
    Undo,
    Redo,
}

/// A named editor action.
#[async_trait]
pub trait Command: Send + Sync {
    /// Unique command id, e.g. `delete-selected`.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn label(&self) -> &str;

    /// Default key binding, e.g. `Mod+Shift+Z`.
    fn shortcut(&self) -> Option<&str> {
        None
    }

    /// Guard; when false the command is not run.
    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        let _ = ctx;
        true
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect>;
}

/// Normalize a shortcut so `shift+mod+z` and `Mod+Shift+Z` compare equal.
///
/// Modifiers are lowercased and sorted; the final key is lowercased.
pub fn normalize_shortcut(shortcut: &str) -> String {
    let mut parts: Vec<String> = shortcut
        .split('+')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    let Some(key) = parts.pop() else {
        return String::new();
    };
    parts.sort();
    parts.dedup();
    parts.push(key);
    parts.join("+")
}

/// Registry of commands, indexed by id and by shortcut.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
    shortcuts: HashMap<String, String>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.ids())
            .field("shortcuts", &self.shortcuts)
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the built-in commands.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for command in builtin_commands() {
            registry.register(command);
        }
        registry
    }

    /// Register a command, replacing any with the same id. Returns the
    /// replaced command.
    pub fn register(&mut self, command: Arc<dyn Command>) -> Option<Arc<dyn Command>> {
        let id = command.id().to_string();
        let previous = self.unregister(&id);
        if let Some(shortcut) = command.shortcut() {
            self.shortcuts.insert(normalize_shortcut(shortcut), id.clone());
        }
        self.commands.insert(id, command);
        previous
    }

    pub fn unregister(&mut self, id: &str) -> Option<Arc<dyn Command>> {
        let command = self.commands.remove(id)?;
        self.shortcuts.retain(|_, target| target != id);
        Some(command)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    /// Command bound to a shortcut.
    pub fn for_shortcut(&self, shortcut: &str) -> Option<&str> {
        self.shortcuts
            .get(&normalize_shortcut(shortcut))
            .map(String::as_str)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ============================================================================
// Built-in commands
// ============================================================================

/// The commands every engine starts with.
pub fn builtin_commands() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(DeleteSelected),
        Arc::new(DuplicateSelected),
        Arc::new(SelectAll),
        Arc::new(ClearSelection),
        Arc::new(Undo),
        Arc::new(Redo),
    ]
}

/// Selected ids in tree order, skipping any whose ancestor is also selected.
fn selected_roots(ctx: &CommandContext<'_>) -> Vec<String> {
    fn visit(blocks: &[Block], selection: &Selection, out: &mut Vec<String>) {
        for block in blocks {
            if selection.is_selected(&block.id) {
                out.push(block.id.clone());
                continue;
            }
            for (_, children) in block.regions_iter() {
                visit(children, selection, out);
            }
        }
    }
    let mut out = Vec::new();
    visit(ctx.tree, ctx.selection, &mut out);
    out
}

pub struct DeleteSelected;

#[async_trait]
impl Command for DeleteSelected {
    fn id(&self) -> &str {
        "delete-selected"
    }

    fn label(&self) -> &str {
        "Delete selected blocks"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("Mod+Backspace")
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        !ctx.selection.is_empty()
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        let edits = selected_roots(ctx)
            .into_iter()
            .map(|block_id| Edit::Delete { block_id })
            .collect();
        Ok(CommandEffect::Edits(edits))
    }
}

pub struct DuplicateSelected;

#[async_trait]
impl Command for DuplicateSelected {
    fn id(&self) -> &str {
        "duplicate-selected"
    }

    fn label(&self) -> &str {
        "Duplicate selected blocks"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("Mod+D")
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        !ctx.selection.is_empty()
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        let edits = selected_roots(ctx)
            .into_iter()
            .map(|block_id| Edit::Duplicate {
                block_id,
                position: None,
            })
            .collect();
        Ok(CommandEffect::Edits(edits))
    }
}

pub struct SelectAll;

#[async_trait]
impl Command for SelectAll {
    fn id(&self) -> &str {
        "select-all"
    }

    fn label(&self) -> &str {
        "Select all blocks"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("Mod+A")
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        Ok(CommandEffect::Select(
            walk(ctx.tree).map(|b| b.id.clone()).collect(),
        ))
    }
}

pub struct ClearSelection;

#[async_trait]
impl Command for ClearSelection {
    fn id(&self) -> &str {
        "clear-selection"
    }

    fn label(&self) -> &str {
        "Clear selection"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("Escape")
    }

    async fn execute(&self, _ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        Ok(CommandEffect::Select(BTreeSet::new()))
    }
}

pub struct Undo;

#[async_trait]
impl Command for Undo {
    fn id(&self) -> &str {
        "undo"
    }

    fn label(&self) -> &str {
        "Undo"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("Mod+Z")
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.can_undo
    }

    async fn execute(&self, _ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        Ok(CommandEffect::Undo)
    }
}

pub struct Redo;

#[async_trait]
impl Command for Redo {
    fn id(&self) -> &str {
        "redo"
    }

    fn label(&self) -> &str {
        "Redo"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("Mod+Shift+Z")
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.can_redo
    }

    async fn execute(&self, _ctx: &CommandContext<'_>) -> anyhow::Result<CommandEffect> {
        Ok(CommandEffect::Redo)
    }
}
