//! Undo/redo over committed trees.
//!
//! [`History`] owns the live tree. A commit diffs the current tree against the
//! proposed one and records the patches in both directions; undo and redo
//! replay them. A new commit after an undo discards the redo stack (linear
//! history, no branches).

use std::collections::VecDeque;

use quire_types::Block;

use crate::patch::{Patch, diff};
use crate::walk::validate_tree;
use crate::Result;

/// Default maximum number of undo steps.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One committed transform.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    /// Old tree → new tree.
    pub patches: Vec<Patch>,
    /// New tree → old tree, already in application order.
    pub inverse_patches: Vec<Patch>,
}

impl HistoryEntry {
    fn new(patches: Vec<Patch>) -> Self {
        let inverse_patches = patches.iter().rev().map(Patch::inverse).collect();
        Self {
            patches,
            inverse_patches,
        }
    }
}

/// The live tree plus its undo and redo stacks.
///
/// The undo stack is bounded by `limit` (0 means unbounded); when it
/// overflows the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct History {
    tree: Vec<Block>,
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    limit: usize,
    /// Distance from the saved state.
    ///
    /// - `Some(0)`: the tree matches the last save
    /// - `Some(n)`, `n > 0`: `n` undos reach the saved state
    /// - `Some(n)`, `n < 0`: `|n|` redos reach the saved state
    /// - `None`: the saved state is no longer reachable
    save_distance: Option<i64>,
}

impl History {
    pub fn new(tree: Vec<Block>, limit: usize) -> Self {
        Self {
            tree,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit,
            save_distance: Some(0),
        }
    }

    pub fn tree(&self) -> &[Block] {
        &self.tree
    }

    /// Replace the tree wholesale and forget all history. The new tree is
    /// treated as saved.
    pub fn reset(&mut self, tree: Vec<Block>) {
        self.tree = tree;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.save_distance = Some(0);
    }

    /// Make `next` the current tree, recording the change.
    ///
    /// Returns `Ok(false)` (and records nothing) when `next` equals the
    /// current tree. A tree with a duplicate id is refused.
    pub fn commit(&mut self, next: Vec<Block>) -> Result<bool> {
        validate_tree(&next)?;
        let patches = diff(&self.tree, &next);
        if patches.is_empty() {
            return Ok(false);
        }

        tracing::debug!(patches = patches.len(), "history commit");
        self.tree = next;

        // The save point can never be reached again once it sat on the redo side.
        if self.save_distance.is_some_and(|d| d < 0) {
            self.save_distance = None;
        }
        self.redo_stack.clear();
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }

        self.push_undo(HistoryEntry::new(patches));
        Ok(true)
    }

    /// Revert the most recent commit. Returns `Ok(false)` if there is none.
    ///
    /// Application is atomic: if a patch fails, the tree and both stacks are
    /// left as they were.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(entry) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        match apply(&self.tree, &entry.inverse_patches) {
            Ok(tree) => {
                self.tree = tree;
                self.redo_stack.push(entry);
                if let Some(d) = &mut self.save_distance {
                    *d -= 1;
                }
                tracing::debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "undo");
                Ok(true)
            }
            Err(e) => {
                self.undo_stack.push_back(entry);
                Err(e)
            }
        }
    }

    /// Re-apply the most recently undone commit. Returns `Ok(false)` if there is none.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match apply(&self.tree, &entry.patches) {
            Ok(tree) => {
                self.tree = tree;
                if let Some(d) = &mut self.save_distance {
                    *d += 1;
                }
                self.push_undo(entry);
                tracing::debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "redo");
                Ok(true)
            }
            Err(e) => {
                self.redo_stack.push(entry);
                Err(e)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Record that the current tree has been saved.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
    }

    /// True when the current tree differs from the last saved state.
    pub fn is_dirty(&self) -> bool {
        self.save_distance != Some(0)
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
            if self
                .save_distance
                .is_some_and(|d| d > self.undo_stack.len() as i64)
            {
                self.save_distance = None;
            }
        }
    }
}

/// Apply patches to a copy of `tree`.
fn apply(tree: &[Block], patches: &[Patch]) -> Result<Vec<Block>> {
    let mut next = tree.to_vec();
    for patch in patches {
        patch.apply(&mut next)?;
    }
    Ok(next)
}
