//! Structural diff between two trees.
//!
//! A diff is a list of [`Patch`]es. Each patch addresses one array (by the
//! path from the root) or one block (by path + index), and carries both the
//! old and the new value so it can be inverted without the original tree.
//!
//! The diff never emits two patches whose targets overlap: at any one array it
//! emits either a single splice or recurses into same-id blocks, never both.
//! Patches of one diff can therefore be applied in any order.

use std::collections::BTreeSet;

use quire_types::{Block, PathStep};
use serde::{Deserialize, Serialize};

use crate::walk::array_at_mut;
use crate::{Result, TreeError};

/// One edit to a tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Patch {
    /// Replace `removed` with `inserted` starting at `index` in the array at `path`.
    Splice {
        path: Vec<PathStep>,
        index: usize,
        removed: Vec<Block>,
        inserted: Vec<Block>,
    },
    /// Swap the non-region fields of the block at `path`/`index`.
    ///
    /// `before` and `after` are region-less shells; the block's children are
    /// left alone.
    Replace {
        path: Vec<PathStep>,
        index: usize,
        before: Block,
        after: Block,
    },
}

impl Patch {
    /// The patch that undoes this one.
    pub fn inverse(&self) -> Patch {
        match self {
            Patch::Splice {
                path,
                index,
                removed,
                inserted,
            } => Patch::Splice {
                path: path.clone(),
                index: *index,
                removed: inserted.clone(),
                inserted: removed.clone(),
            },
            Patch::Replace {
                path,
                index,
                before,
                after,
            } => Patch::Replace {
                path: path.clone(),
                index: *index,
                before: after.clone(),
                after: before.clone(),
            },
        }
    }

    /// Apply to a tree in place.
    ///
    /// The tree is checked against the patch's recorded old state (by id)
    /// first; on mismatch nothing is changed and `InvalidPath` is returned.
    pub fn apply(&self, tree: &mut Vec<Block>) -> Result<()> {
        match self {
            Patch::Splice {
                path,
                index,
                removed,
                inserted,
            } => {
                let array = array_at_mut(tree, path)
                    .ok_or_else(|| TreeError::InvalidPath(describe(path, *index)))?;
                let end = index + removed.len();
                let matches = end <= array.len()
                    && array[*index..end]
                        .iter()
                        .zip(removed)
                        .all(|(have, want)| have.id == want.id);
                if !matches {
                    return Err(TreeError::InvalidPath(describe(path, *index)));
                }
                array.splice(*index..end, inserted.iter().cloned());
                Ok(())
            }
            Patch::Replace {
                path,
                index,
                before,
                after,
            } => {
                let block = array_at_mut(tree, path)
                    .and_then(|array| array.get_mut(*index))
                    .filter(|block| block.id == before.id)
                    .ok_or_else(|| TreeError::InvalidPath(describe(path, *index)))?;
                block.id = after.id.clone();
                block.block_type = after.block_type.clone();
                block.content = after.content.clone();
                block.config = after.config.clone();
                block.metadata = after.metadata;
                Ok(())
            }
        }
    }
}

fn describe(path: &[PathStep], index: usize) -> String {
    let mut out = String::from("/");
    for step in path {
        out.push_str(&format!("{}.{}/", step.index, step.region));
    }
    out.push_str(&index.to_string());
    out
}

/// Compute the patches that turn `old` into `new`.
pub fn diff(old: &[Block], new: &[Block]) -> Vec<Patch> {
    let mut patches = Vec::new();
    diff_array(&mut Vec::new(), old, new, &mut patches);
    patches
}

fn diff_array(path: &mut Vec<PathStep>, old: &[Block], new: &[Block], out: &mut Vec<Patch>) {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];
    if old_mid.is_empty() && new_mid.is_empty() {
        return;
    }

    let same_ids = old_mid.len() == new_mid.len()
        && old_mid.iter().zip(new_mid).all(|(a, b)| a.id == b.id);
    if same_ids {
        for (offset, (a, b)) in old_mid.iter().zip(new_mid).enumerate() {
            diff_block(path, prefix + offset, a, b, out);
        }
    } else {
        out.push(Patch::Splice {
            path: path.clone(),
            index: prefix,
            removed: old_mid.to_vec(),
            inserted: new_mid.to_vec(),
        });
    }
}

fn diff_block(path: &mut Vec<PathStep>, index: usize, old: &Block, new: &Block, out: &mut Vec<Patch>) {
    if !old.fields_eq(new) {
        out.push(Patch::Replace {
            path: path.clone(),
            index,
            before: old.shell(),
            after: new.shell(),
        });
    }

    let names: BTreeSet<&String> = old
        .regions_iter()
        .chain(new.regions_iter())
        .map(|(name, _)| name)
        .collect();
    for name in names {
        path.push(PathStep::new(index, name.clone()));
        diff_array(path, old.children(name), new.children(name), out);
        path.pop();
    }
}
