//! Addressing: where a block lives, and where a block should go.

use serde::{Deserialize, Serialize};

/// One step down the tree: the block at `index` in the current array, then
/// its `region`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathStep {
    pub index: usize,
    pub region: String,
}

impl PathStep {
    pub fn new(index: usize, region: impl Into<String>) -> Self {
        Self {
            index,
            region: region.into(),
        }
    }
}

/// The location of a block in the tree.
///
/// `path` is the chain of steps from the root array to the array that holds
/// the block; `index` is the block's position inside that array. A root
/// block has an empty path and no parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLocation {
    pub index: usize,
    /// Region of the parent that holds the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Id of the parent block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub path: Vec<PathStep>,
}

impl BlockLocation {
    /// Location of a root-level block.
    pub fn root(index: usize) -> Self {
        Self {
            index,
            region: None,
            parent: None,
            path: Vec::new(),
        }
    }
}

/// How a block is placed relative to its target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "position", rename_all = "lowercase")]
pub enum Placement {
    /// Immediately before the target, in the target's own array.
    Before,
    /// Immediately after the target, in the target's own array.
    After,
    /// Appended to the target's named region (created if absent).
    Inside { region: String },
}

/// A target-relative position for insert, move and duplicate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertPosition {
    pub target_id: String,
    #[serde(flatten)]
    pub placement: Placement,
}

impl InsertPosition {
    pub fn before(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            placement: Placement::Before,
        }
    }

    pub fn after(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            placement: Placement::After,
        }
    }

    pub fn inside(target_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            placement: Placement::Inside {
                region: region.into(),
            },
        }
    }
}

/// Relocate `block_id` (with its subtree). `target: None` appends at the root end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<InsertPosition>,
}

impl MoveRequest {
    pub fn new(block_id: impl Into<String>, target: Option<InsertPosition>) -> Self {
        Self {
            block_id: block_id.into(),
            target,
        }
    }

    /// Move to the end of the root array.
    pub fn to_root_end(block_id: impl Into<String>) -> Self {
        Self::new(block_id, None)
    }
}
