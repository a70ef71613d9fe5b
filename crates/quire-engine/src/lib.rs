//! # quire-engine
//!
//! The editing engine on top of the quire block tree.
//!
//! An [`Engine`] owns one document and is the only way to change it:
//! - Every mutation runs plugin hooks, a pure tree operation from
//!   `quire-tree`, and one history commit
//! - Undo/redo replay inverse patches
//! - Selection and focus never point at blocks that are gone
//! - Events go out on a pattern-filtered bus (`block:*`, `history:>`, ...)
//! - Saves are debounced and written through a [`DocumentSink`]
//!
//! Document formats live behind the [`Adapter`] trait; [`JsonAdapter`] is the
//! built-in one.

pub mod adapter;
mod autosave;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod json_adapter;
pub mod plugin;
pub mod selection;
pub mod sink;

pub use adapter::{Adapter, BlockDefinition, FieldDefinition, ValidationIssue};
pub use commands::{
    Command, CommandContext, CommandEffect, CommandRegistry, Edit, builtin_commands,
    normalize_shortcut,
};
pub use config::{AutosaveConfig, EngineConfig, EventsConfig, HistoryConfig, TextConfig};
pub use engine::Engine;
pub use error::{AdapterError, BoxError, EngineError, Result};
pub use events::{EditorEvent, EventBus, EventKind, Subscription, matches_pattern};
pub use json_adapter::JsonAdapter;
pub use plugin::{Plugin, PluginChain};
pub use selection::Selection;
pub use sink::{DocumentSink, FileSink, MemorySink};

pub use quire_tree::{Found, History, TreeError};
pub use quire_types::{
    Block, BlockLocation, BlockMetadata, BlockPatch, Fields, InsertPosition, MoveRequest,
    Placement,
};
