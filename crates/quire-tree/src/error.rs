//! Error types for tree operations.

use thiserror::Error;

/// Errors raised by tree operations and history.
///
/// A missing block id is deliberately **not** an error: every operation that
/// targets a block degrades to a no-op when the block is gone, so stale
/// references from the UI stay harmless.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Merge attempted across block types.
    #[error("cannot merge {first} ({first_type}) with {second} ({second_type}): block types differ")]
    TypeMismatch {
        first: String,
        second: String,
        first_type: String,
        second_type: String,
    },

    /// Split/merge addressed a content field that holds a non-string value.
    #[error("field {field:?} of block {block_id} is not text")]
    NotText { block_id: String, field: String },

    /// The same id appears twice in a tree.
    #[error("duplicate block id: {0}")]
    DuplicateId(String),

    /// A patch addressed a location that does not exist.
    #[error("invalid tree path: {0}")]
    InvalidPath(String),
}
