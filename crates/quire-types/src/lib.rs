//! Shared block types for quire.
//!
//! This crate is the data foundation of the editor: the recursive [`Block`]
//! node, the addressing types used by every tree operation, and block id
//! generation. It has **no internal quire dependencies**; a pure leaf crate
//! that the tree and engine crates build on.
//!
//! # Tree Overview
//!
//! ```text
//! root: Vec<Block>
//!     └── Block (id, type, content, config, metadata)
//!         └── regions: "body" -> Vec<Block>
//!                      "aside" -> Vec<Block>
//!                          └── Block ...
//! ```
//!
//! # Key Types
//!
//! |-------------------|------------------------------------------------|
//! | Type              | Purpose                                        |
//! |-------------------|------------------------------------------------|
//! | [`Block`]         | A typed node owning its region children        |
//! | [`BlockMetadata`] | Creation/update timestamps and edit version    |
//! | [`BlockPatch`]    | Partial content/config for shallow merges      |
//! | [`BlockLocation`] | Where a block lives (path from the root)       |
//! | [`InsertPosition`]| Target-relative placement for insert and move  |
//! | [`MoveRequest`]   | A block id plus its new placement              |
//! |-------------------|------------------------------------------------|

pub mod block;
pub mod ids;
pub mod position;

pub use block::{Block, BlockMetadata, BlockPatch, Fields, Regions};
pub use ids::new_block_id;
pub use position::{BlockLocation, InsertPosition, MoveRequest, PathStep, Placement};

/// Current time as Unix milliseconds. Used for block metadata timestamps.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
