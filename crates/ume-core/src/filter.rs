//! Filter engine.
//!
//! Reduces a snapshot to the subset matching a [`FilterState`]. Every
//! condition is optional and all active conditions are combined with AND;
//! an empty state passes every record through unchanged.

use crate::model::{Flag, Record, TextField, TimeField};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A time-based condition.
///
/// The reference instant is always carried in the condition so that
/// filtering never reads the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateCondition {
    /// Timestamp falls on this calendar day (UTC).
    On { field: TimeField, date: NaiveDate },
    /// Timestamp within `[from, to]`, both inclusive.
    Between {
        field: TimeField,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    /// Due before `as_of` and not completed.
    Overdue { as_of: DateTime<Utc> },
}

impl DateCondition {
    /// Returns true if the record satisfies the condition. Records without
    /// the relevant timestamp never match.
    pub fn matches<R: Record + ?Sized>(&self, item: &R) -> bool {
        match *self {
            Self::On { field, date } => item
                .timestamp(field)
                .is_some_and(|ts| ts.date_naive() == date),
            Self::Between { field, from, to } => item
                .timestamp(field)
                .is_some_and(|ts| from <= ts && ts <= to),
            Self::Overdue { as_of } => {
                item.flag(Flag::Completed) != Some(true)
                    && item.timestamp(TimeField::Due).is_some_and(|due| due < as_of)
            }
        }
    }
}

/// Filter criteria applied to a record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Ord"
))]
pub struct FilterState<T> {
    /// Free-text query, matched against the search scope. Blank means no
    /// restriction.
    #[serde(default)]
    pub query: String,
    /// Per-field substring conditions.
    #[serde(default)]
    pub field_queries: BTreeMap<TextField, String>,
    /// Allowed tags. Empty means every tag passes.
    #[serde(default)]
    pub tags: BTreeSet<T>,
    /// Required flag values.
    #[serde(default)]
    pub flags: BTreeMap<Flag, bool>,
    #[serde(default)]
    pub date: Option<DateCondition>,
    /// Overrides the record type's default search fields.
    #[serde(default)]
    pub scope: Option<Vec<TextField>>,
}

impl<T> Default for FilterState<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            field_queries: BTreeMap::new(),
            tags: BTreeSet::new(),
            flags: BTreeMap::new(),
            date: None,
            scope: None,
        }
    }
}

impl<T: Ord + Copy> FilterState<T> {
    /// Returns true if no filter criteria are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.field_queries.values().all(|q| q.trim().is_empty())
            && self.tags.is_empty()
            && self.flags.is_empty()
            && self.date.is_none()
    }

    /// Whether records failing the `Active` flag are shown.
    #[must_use]
    pub fn includes_inactive(&self) -> bool {
        self.flags.get(&Flag::Active) != Some(&true)
    }

    /// Show or hide inactive records.
    pub fn set_include_inactive(&mut self, include: bool) {
        if include {
            self.flags.remove(&Flag::Active);
        } else {
            self.flags.insert(Flag::Active, true);
        }
    }

    /// Add the tag to the allowed set, or remove it if already present.
    /// Returns whether the tag is now allowed.
    pub fn toggle_tag(&mut self, tag: T) -> bool {
        if self.tags.remove(&tag) {
            false
        } else {
            self.tags.insert(tag);
            true
        }
    }

    /// Apply this filter to a list of records.
    ///
    /// Returns references to the matching records in input order.
    pub fn apply<'a, R>(&self, items: &'a [R]) -> Vec<&'a R>
    where
        R: Record<Tag = T>,
    {
        let compiled = Compiled::new(self, R::SEARCH_FIELDS);
        let kept: Vec<&R> = items.iter().filter(|item| compiled.matches(*item)).collect();
        tracing::trace!(total = items.len(), kept = kept.len(), "filter applied");
        kept
    }

    /// Returns true if the record satisfies all active filter criteria.
    pub fn matches<R>(&self, item: &R) -> bool
    where
        R: Record<Tag = T>,
    {
        Compiled::new(self, R::SEARCH_FIELDS).matches(item)
    }
}

/// Filter `items` by `state`. Same as [`FilterState::apply`].
pub fn filter<'a, R: Record>(items: &'a [R], state: &FilterState<R::Tag>) -> Vec<&'a R> {
    state.apply(items)
}

/// Case-insensitive substring test. The needle must already be lowercase.
fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// A filter state with its queries trimmed and lowercased once per pass.
struct Compiled<'s, T> {
    state: &'s FilterState<T>,
    query: Option<String>,
    fields: &'s [TextField],
    field_queries: Vec<(TextField, String)>,
}

impl<'s, T: Ord + Copy> Compiled<'s, T> {
    fn new(state: &'s FilterState<T>, default_fields: &'s [TextField]) -> Self {
        let query = Some(state.query.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let field_queries = state
            .field_queries
            .iter()
            .filter(|(_, q)| !q.trim().is_empty())
            .map(|(field, q)| (*field, q.trim().to_lowercase()))
            .collect();
        Self {
            state,
            query,
            fields: state.scope.as_deref().unwrap_or(default_fields),
            field_queries,
        }
    }

    fn matches<R: Record<Tag = T>>(&self, item: &R) -> bool {
        if !self.state.tags.is_empty() {
            match item.tag() {
                Some(tag) if self.state.tags.contains(&tag) => {}
                _ => return false,
            }
        }
        for (flag, required) in &self.state.flags {
            if item.flag(*flag) != Some(*required) {
                return false;
            }
        }
        if let Some(ref date) = self.state.date {
            if !date.matches(item) {
                return false;
            }
        }
        for (field, q) in &self.field_queries {
            if !item.text(*field).is_some_and(|v| contains_folded(&v, q)) {
                return false;
            }
        }
        if let Some(ref q) = self.query {
            let hit = self
                .fields
                .iter()
                .any(|field| item.text(*field).is_some_and(|v| contains_folded(&v, q)));
            if !hit {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
