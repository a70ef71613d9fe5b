//! Block-tree operations and history for quire.
//!
//! Every operation here is a pure function from one tree to another: the
//! input slice is never touched, the result is a freshly built `Vec<Block>`.
//! Side effects (events, saving, plugins) belong to the engine crate.
//!
//! # Not-found policy
//!
//! Operations that target a block id which is not in the tree return the tree
//! unchanged. Only genuine conflicts are errors:
//!
//! - merging two blocks of different types ([`TreeError::TypeMismatch`])
//! - splitting or merging a field that holds a non-string value
//!   ([`TreeError::NotText`])
//!
//! # History
//!
//! [`History`] owns the live tree. Each [`History::commit`] diffs the old and
//! new tree into [`Patch`]es and keeps both directions, so undo and redo are
//! just patch application.

mod error;
pub mod history;
pub mod ops;
pub mod patch;
pub mod walk;

pub use error::TreeError;
pub use history::{DEFAULT_HISTORY_LIMIT, History, HistoryEntry};
pub use ops::{
    DEFAULT_TEXT_FIELD, convert_block, duplicate_block, insert_block, merge_blocks, move_block,
    remove_block, split_block, update_block,
};
pub use patch::{Patch, diff};
pub use walk::{
    Found, Walk, collect_ids, contains_block, count_blocks, find_block, validate_tree, walk,
};

pub use quire_types::{
    Block, BlockLocation, BlockMetadata, BlockPatch, Fields, InsertPosition, MoveRequest,
    PathStep, Placement, Regions,
};

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
