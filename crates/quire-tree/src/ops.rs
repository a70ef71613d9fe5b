//! Pure tree transformations.
//!
//! Each function takes the current tree by reference and returns a new one.
//! Targeting follows one set of rules everywhere (see [`InsertPosition`]):
//!
//! - no position: append at the end of the root array
//! - `Before` / `After`: splice next to the target, in the target's array
//! - `Inside { region }`: append to the target's region, creating it
//! - target not found: fall back to appending at the root end

use std::collections::{BTreeMap, HashSet};

use quire_types::{Block, BlockMetadata, BlockPatch, InsertPosition, MoveRequest, PathStep, Placement, new_block_id};
use serde_json::Value;

use crate::walk::{array_at_mut, collect_ids, contains_block, find_block, find_block_mut, take_block};
use crate::{Result, TreeError};

/// Content field used by split/merge when the caller does not name one.
pub const DEFAULT_TEXT_FIELD: &str = "text";

/// Insert `block` at `position`.
pub fn insert_block(tree: &[Block], block: Block, position: Option<&InsertPosition>) -> Vec<Block> {
    let mut next = tree.to_vec();
    insert_into(&mut next, block, position);
    next
}

/// Remove a block and its entire subtree.
pub fn remove_block(tree: &[Block], id: &str) -> Vec<Block> {
    let mut next = tree.to_vec();
    take_block(&mut next, id);
    next
}

/// Shallow-merge `patch` into a block's content/config and bump its version.
pub fn update_block(tree: &[Block], id: &str, patch: &BlockPatch) -> Vec<Block> {
    let mut next = tree.to_vec();
    if let Some(block) = find_block_mut(&mut next, id) {
        patch.apply_to(block);
        block.metadata.touch();
    }
    next
}

/// Relocate a block together with its subtree.
///
/// Moving a block next to itself or into its own subtree would detach it
/// from the tree, so those requests leave the tree unchanged.
pub fn move_block(tree: &[Block], request: &MoveRequest) -> Vec<Block> {
    let Some(found) = find_block(tree, &request.block_id) else {
        return tree.to_vec();
    };
    if let Some(target) = &request.target
        && contains_block(std::slice::from_ref(found.block), &target.target_id)
    {
        tracing::debug!(
            block = %request.block_id,
            target = %target.target_id,
            "ignoring move into own subtree"
        );
        return tree.to_vec();
    }

    let mut next = tree.to_vec();
    if let Some(block) = take_block(&mut next, &request.block_id) {
        insert_into(&mut next, block, request.target.as_ref());
    }
    next
}

/// Deep-clone a block's subtree under brand-new ids.
///
/// The clone lands immediately after the source unless `position` says
/// otherwise. Returns the new tree and the clone's id (`None` when the source
/// does not exist).
pub fn duplicate_block(
    tree: &[Block],
    id: &str,
    position: Option<&InsertPosition>,
) -> (Vec<Block>, Option<String>) {
    let Some(found) = find_block(tree, id) else {
        return (tree.to_vec(), None);
    };

    let mut taken = collect_ids(tree);
    let clone = reidentify(found.block.clone(), &mut taken);
    let clone_id = clone.id.clone();

    let default_position = InsertPosition::after(id);
    let mut next = tree.to_vec();
    insert_into(&mut next, clone, Some(position.unwrap_or(&default_position)));
    (next, Some(clone_id))
}

/// Split a text field at a character offset.
///
/// The original keeps the left part; a new sibling of the same type holding
/// only the right part is inserted right after it. Offsets past the end split
/// at the end. Returns the new tree and the new sibling's id.
pub fn split_block(
    tree: &[Block],
    id: &str,
    split_index: usize,
    field: &str,
) -> Result<(Vec<Block>, Option<String>)> {
    let Some(found) = find_block(tree, id) else {
        return Ok((tree.to_vec(), None));
    };

    let text = text_of(found.block, field)?;
    let at = text
        .char_indices()
        .nth(split_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len());
    let (left, right) = text.split_at(at);

    let mut taken = collect_ids(tree);
    let mut sibling = Block::with_id(fresh_id(&mut taken), found.block.block_type.clone());
    sibling.config = found.block.config.clone();
    sibling
        .content
        .insert(field.to_string(), Value::String(right.to_string()));
    let sibling_id = sibling.id.clone();

    let mut next = tree.to_vec();
    if let Some(block) = find_block_mut(&mut next, id) {
        block
            .content
            .insert(field.to_string(), Value::String(left.to_string()));
        block.metadata.touch();
    }
    insert_into(&mut next, sibling, Some(&InsertPosition::after(id)));
    Ok((next, Some(sibling_id)))
}

/// Append `second`'s text onto `first` and remove `second` with its subtree.
///
/// Blocks must share a type. Merging a block with itself, or with one of its
/// own ancestors, leaves the tree unchanged.
pub fn merge_blocks(tree: &[Block], first: &str, second: &str, field: &str) -> Result<Vec<Block>> {
    if first == second {
        return Ok(tree.to_vec());
    }
    let (Some(a), Some(b)) = (find_block(tree, first), find_block(tree, second)) else {
        return Ok(tree.to_vec());
    };
    if a.block.block_type != b.block.block_type {
        return Err(TreeError::TypeMismatch {
            first: first.to_string(),
            second: second.to_string(),
            first_type: a.block.block_type.clone(),
            second_type: b.block.block_type.clone(),
        });
    }
    if contains_block(std::slice::from_ref(b.block), first) {
        return Ok(tree.to_vec());
    }

    let merged = text_of(a.block, field)? + &text_of(b.block, field)?;

    let mut next = tree.to_vec();
    take_block(&mut next, second);
    if let Some(block) = find_block_mut(&mut next, first) {
        block.content.insert(field.to_string(), Value::String(merged));
        block.metadata.touch();
    }
    Ok(next)
}

/// Change a block's type.
///
/// With a mapping, content is rewritten field by field (old name → new name)
/// and unmapped fields are dropped; without one it is kept verbatim. Regions
/// are kept as they are.
pub fn convert_block(
    tree: &[Block],
    id: &str,
    new_type: &str,
    field_mapping: Option<&BTreeMap<String, String>>,
) -> Vec<Block> {
    let mut next = tree.to_vec();
    if let Some(block) = find_block_mut(&mut next, id) {
        block.block_type = new_type.to_string();
        if let Some(mapping) = field_mapping {
            let old = std::mem::take(&mut block.content);
            for (name, value) in old {
                if let Some(renamed) = mapping.get(&name) {
                    block.content.insert(renamed.clone(), value);
                }
            }
        }
        block.metadata.touch();
    }
    next
}

// ============================================================================
// Helpers
// ============================================================================

/// Insert into an owned tree using the shared targeting rules.
pub(crate) fn insert_into(tree: &mut Vec<Block>, block: Block, position: Option<&InsertPosition>) {
    let location = position.and_then(|pos| {
        find_block(tree, &pos.target_id).map(|found| (pos, found.location))
    });
    let Some((position, location)) = location else {
        if let Some(pos) = position {
            tracing::debug!(target = %pos.target_id, "insert target missing, appending at root");
        }
        tree.push(block);
        return;
    };

    match &position.placement {
        Placement::Before | Placement::After => {
            let offset = usize::from(position.placement == Placement::After);
            if let Some(array) = array_at_mut(tree, &location.path) {
                array.insert(location.index + offset, block);
            }
        }
        Placement::Inside { region } => {
            let mut path = location.path;
            path.push(PathStep::new(location.index, region.clone()));
            if let Some(array) = array_at_mut(tree, &path) {
                array.push(block);
            }
        }
    }
}

/// Read a text field; a missing field reads as empty.
fn text_of(block: &Block, field: &str) -> Result<String> {
    match block.content.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(TreeError::NotText {
            block_id: block.id.clone(),
            field: field.to_string(),
        }),
    }
}

/// Mint an id not present in `taken`, and reserve it.
fn fresh_id(taken: &mut HashSet<String>) -> String {
    loop {
        let id = new_block_id();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// Give a subtree fresh ids and fresh metadata.
fn reidentify(mut block: Block, taken: &mut HashSet<String>) -> Block {
    block.id = fresh_id(taken);
    block.metadata = BlockMetadata::new();
    if let Some(regions) = block.regions.take() {
        block.regions = Some(
            regions
                .into_iter()
                .map(|(name, children)| {
                    let children = children
                        .into_iter()
                        .map(|child| reidentify(child, taken))
                        .collect();
                    (name, children)
                })
                .collect(),
        );
    }
    block
}
