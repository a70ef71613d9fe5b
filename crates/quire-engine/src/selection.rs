//! Selection and focus state.

use std::collections::BTreeSet;

use quire_tree::walk;
use quire_types::Block;

/// Selected block ids plus at most one focused id.
///
/// This type does not know the tree; the engine checks that an id exists
/// before calling `select`/`focus`, and calls [`Selection::retain_existing`]
/// after anything that can remove blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<String>,
    focused: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Returns true if the selection changed.
    pub fn select(&mut self, id: &str) -> bool {
        self.selected.insert(id.to_string())
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        self.selected.remove(id)
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Replace the whole selection.
    pub fn set(&mut self, ids: BTreeSet<String>) -> bool {
        if self.selected == ids {
            return false;
        }
        self.selected = ids;
        true
    }

    pub fn focus(&mut self, id: &str) -> bool {
        if self.focused.as_deref() == Some(id) {
            return false;
        }
        self.focused = Some(id.to_string());
        true
    }

    pub fn blur(&mut self) -> bool {
        self.focused.take().is_some()
    }

    /// Drop ids that no longer exist in `tree`.
    ///
    /// Returns `(selection_changed, focus_changed)`.
    pub fn retain_existing(&mut self, tree: &[Block]) -> (bool, bool) {
        if self.selected.is_empty() && self.focused.is_none() {
            return (false, false);
        }
        let live: BTreeSet<&str> = walk(tree).map(|b| b.id.as_str()).collect();

        let before = self.selected.len();
        self.selected.retain(|id| live.contains(id.as_str()));
        let selection_changed = self.selected.len() != before;

        let focus_changed = match &self.focused {
            Some(id) if !live.contains(id.as_str()) => {
                self.focused = None;
                true
            }
            _ => false,
        };
        (selection_changed, focus_changed)
    }
}
