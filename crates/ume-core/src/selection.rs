//! Multi-selection over a record list.
//!
//! Two scopes exist for bulk changes and each has its own method: the
//! visible (filtered) view and the full snapshot. Visible-scoped operations
//! never touch selections outside the view.

use crate::model::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Identities currently marked for a batch action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Selected identities in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }

    /// Returns true if the identity was newly selected.
    pub fn select(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Returns true if the identity had been selected.
    pub fn deselect(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Flip one identity. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// True when the view is non-empty and every visible record is selected.
    pub fn all_selected<R: Record>(&self, visible: &[&R]) -> bool {
        !visible.is_empty() && visible.iter().all(|r| self.contains(r.id()))
    }

    /// Select every visible record, or deselect them all if they already are.
    pub fn toggle_all_visible<R: Record>(&mut self, visible: &[&R]) {
        if self.all_selected(visible) {
            for r in visible {
                self.ids.remove(r.id());
            }
        } else {
            self.ids.extend(visible.iter().map(|r| r.id().to_string()));
        }
    }

    /// Flip the selection state of every visible record.
    pub fn invert_visible<R: Record>(&mut self, visible: &[&R]) {
        for r in visible {
            self.toggle(r.id());
        }
    }

    /// Replace the selection with its complement over the whole snapshot.
    pub fn invert_all<R: Record>(&mut self, all: &[R]) {
        let inverted = all
            .iter()
            .map(Record::id)
            .filter(|id| !self.ids.contains(*id))
            .map(str::to_string)
            .collect();
        self.ids = inverted;
    }

    /// Drop identities with no record in `source`. Returns how many were
    /// dropped.
    pub fn prune<R: Record>(&mut self, source: &[R]) -> usize {
        let present: HashSet<&str> = source.iter().map(Record::id).collect();
        let before = self.ids.len();
        self.ids.retain(|id| present.contains(id.as_str()));
        before - self.ids.len()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;

    fn users(ids: &[&str]) -> Vec<User> {
        ids.iter().map(|id| User::new(*id, *id)).collect()
    }

    fn selected(set: &SelectionSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = SelectionSet::new();
        assert!(set.toggle("a"));
        assert!(set.contains("a"));
        assert!(!set.toggle("a"));
        assert!(set.is_empty());
    }

    #[test]
    fn toggle_all_visible_leaves_hidden_selections_alone() {
        let all = users(&["a", "b", "c", "d"]);
        let visible: Vec<&User> = all.iter().take(2).collect();
        let mut set: SelectionSet = ["d"].into_iter().collect();

        set.toggle_all_visible(&visible);
        assert_eq!(selected(&set), vec!["a", "b", "d"]);

        set.toggle_all_visible(&visible);
        assert_eq!(selected(&set), vec!["d"]);
    }

    #[test]
    fn toggle_all_with_partial_selection_selects_rest() {
        let all = users(&["a", "b", "c"]);
        let visible: Vec<&User> = all.iter().collect();
        let mut set: SelectionSet = ["b"].into_iter().collect();
        set.toggle_all_visible(&visible);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn toggle_all_on_empty_view_is_noop() {
        let mut set: SelectionSet = ["x"].into_iter().collect();
        set.toggle_all_visible::<User>(&[]);
        assert_eq!(selected(&set), vec!["x"]);
        assert!(!set.all_selected::<User>(&[]));
    }

    #[test]
    fn invert_scopes_differ() {
        let all = users(&["a", "b", "c", "d"]);
        let visible: Vec<&User> = all.iter().take(2).collect();

        let mut scoped: SelectionSet = ["a", "c"].into_iter().collect();
        scoped.invert_visible(&visible);
        assert_eq!(selected(&scoped), vec!["b", "c"]);

        let mut full: SelectionSet = ["a", "c"].into_iter().collect();
        full.invert_all(&all);
        assert_eq!(selected(&full), vec!["b", "d"]);
    }

    #[test]
    fn prune_drops_missing_records() {
        let remaining = users(&["a", "c"]);
        let mut set: SelectionSet = ["a", "b", "c"].into_iter().collect();
        assert_eq!(set.prune(&remaining), 1);
        assert_eq!(selected(&set), vec!["a", "c"]);
    }
}
