//! Lookup and traversal.
//!
//! Traversal order is the canonical depth-first order used everywhere in
//! quire: the root array in order; for each visited block, its regions in
//! sorted name order, each region's children in array order.

use std::collections::HashSet;

use quire_types::{Block, BlockLocation, PathStep};

use crate::{Result, TreeError};

/// A located block.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<'a> {
    pub block: &'a Block,
    pub location: BlockLocation,
    /// The block whose region holds this one (`None` at the root).
    pub parent: Option<&'a Block>,
}

/// Find a block anywhere in the tree.
pub fn find_block<'a>(tree: &'a [Block], id: &str) -> Option<Found<'a>> {
    find_in(tree, id, &mut Vec::new(), None)
}

fn find_in<'a>(
    blocks: &'a [Block],
    id: &str,
    path: &mut Vec<PathStep>,
    parent: Option<(&'a Block, &'a str)>,
) -> Option<Found<'a>> {
    for (index, block) in blocks.iter().enumerate() {
        if block.id == id {
            let location = match parent {
                None => BlockLocation::root(index),
                Some((p, region)) => BlockLocation {
                    index,
                    region: Some(region.to_string()),
                    parent: Some(p.id.clone()),
                    path: path.clone(),
                },
            };
            return Some(Found {
                block,
                location,
                parent: parent.map(|(p, _)| p),
            });
        }
        for (region, children) in block.regions_iter() {
            path.push(PathStep::new(index, region.clone()));
            if let Some(found) = find_in(children, id, path, Some((block, region.as_str()))) {
                return Some(found);
            }
            path.pop();
        }
    }
    None
}

/// True if a block with this id exists anywhere in `tree`.
pub fn contains_block(tree: &[Block], id: &str) -> bool {
    walk(tree).any(|block| block.id == id)
}

/// Depth-first iterator over every block in the tree.
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, Block>>,
}

/// Walk the tree in canonical order.
pub fn walk(tree: &[Block]) -> Walk<'_> {
    Walk {
        stack: vec![tree.iter()],
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<&'a Block> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(block) => {
                    // Push in reverse so the first region is visited first.
                    let regions: Vec<_> = block
                        .regions_iter()
                        .map(|(_, children)| children.iter())
                        .collect();
                    self.stack.extend(regions.into_iter().rev());
                    return Some(block);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Total number of blocks at every depth and in every region.
pub fn count_blocks(tree: &[Block]) -> usize {
    walk(tree).count()
}

/// Every id in the tree.
pub fn collect_ids(tree: &[Block]) -> HashSet<String> {
    walk(tree).map(|block| block.id.clone()).collect()
}

/// Check the uniqueness invariant: no id appears twice anywhere in the tree.
pub fn validate_tree(tree: &[Block]) -> Result<()> {
    let mut seen = HashSet::new();
    for block in walk(tree) {
        if !seen.insert(block.id.as_str()) {
            return Err(TreeError::DuplicateId(block.id.clone()));
        }
    }
    Ok(())
}

// ============================================================================
// Mutable navigation (crate-internal)
// ============================================================================

/// The array reached by following `path`, creating missing regions on the way.
pub(crate) fn array_at_mut<'a>(
    tree: &'a mut Vec<Block>,
    path: &[PathStep],
) -> Option<&'a mut Vec<Block>> {
    let mut current = tree;
    for step in path {
        current = current.get_mut(step.index)?.region_mut(step.region.as_str());
    }
    Some(current)
}

/// Mutable access to a block by id.
pub(crate) fn find_block_mut<'a>(tree: &'a mut Vec<Block>, id: &str) -> Option<&'a mut Block> {
    let location = find_block(tree, id)?.location;
    array_at_mut(tree, &location.path)?.get_mut(location.index)
}

/// Detach a block (with its subtree) from wherever it lives.
pub(crate) fn take_block(tree: &mut Vec<Block>, id: &str) -> Option<Block> {
    let location = find_block(tree, id)?.location;
    let array = array_at_mut(tree, &location.path)?;
    if location.index < array.len() {
        Some(array.remove(location.index))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{para, sample_tree};

    #[test]
    fn test_find_root_block() {
        let tree = sample_tree();
        let found = find_block(&tree, "b").unwrap();
        assert_eq!(found.block.id, "b");
        assert_eq!(found.location, BlockLocation::root(2));
        assert!(found.parent.is_none());
    }

    #[test]
    fn test_find_nested_block() {
        let tree = sample_tree();
        let found = find_block(&tree, "n").unwrap();

        assert_eq!(found.block.text_field("text"), Some("nested"));
        assert_eq!(found.parent.unwrap().id, "q");
        assert_eq!(found.location.parent.as_deref(), Some("q"));
        assert_eq!(found.location.region.as_deref(), Some("body"));
        assert_eq!(
            found.location.path,
            vec![PathStep::new(1, "right"), PathStep::new(0, "body")]
        );
        assert_eq!(found.location.index, 0);
    }

    #[test]
    fn test_find_missing_block() {
        let tree = sample_tree();
        assert!(find_block(&tree, "nope").is_none());
        assert!(!contains_block(&tree, "nope"));
        assert!(contains_block(&tree, "h"));
    }

    #[test]
    fn test_walk_canonical_order() {
        let tree = sample_tree();
        let ids: Vec<&str> = walk(&tree).map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "h", "q", "n", "b"]);
        assert_eq!(count_blocks(&tree), 6);
    }

    #[test]
    fn test_validate_tree_detects_nested_duplicate() {
        let mut tree = sample_tree();
        assert!(validate_tree(&tree).is_ok());

        tree.push(Block::with_id("x", "columns").child("body", para("h", "dup")));
        assert_eq!(
            validate_tree(&tree),
            Err(TreeError::DuplicateId("h".to_string()))
        );
    }

    #[test]
    fn test_take_block_removes_subtree() {
        let mut tree = sample_tree();
        let taken = take_block(&mut tree, "q").unwrap();
        assert_eq!(taken.subtree_len(), 2);
        assert!(!contains_block(&tree, "n"));
        assert_eq!(count_blocks(&tree), 4);
    }

    #[test]
    fn test_find_block_mut_edits_in_place() {
        let mut tree = sample_tree();
        find_block_mut(&mut tree, "n")
            .unwrap()
            .content
            .insert("text".into(), "edited".into());
        assert_eq!(
            find_block(&tree, "n").unwrap().block.text_field("text"),
            Some("edited")
        );
    }
}
