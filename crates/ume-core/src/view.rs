//! Per-screen list state.
//!
//! [`CollectionView`] owns one snapshot of records plus the filter, sort,
//! page and selection state a list screen shows for it. State changes only
//! through the named transition methods; each one keeps the page index in
//! range and the selection restricted to records in the snapshot.
//!
//! The visible list is recomputed from the snapshot on demand, so a view
//! never holds stale derived data.

use crate::batch::{self, BatchAction, BatchReport, RecordActions};
use crate::error::ExportError;
use crate::export::{CsvOptions, CsvRecord, NameLookup, to_csv_string_with_names};
use crate::filter::{DateCondition, FilterState};
use crate::model::{Flag, Record, TextField};
use crate::page::{PageInfo, Paginator};
use crate::selection::SelectionSet;
use crate::sort::{SortPolicy, sort};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Which records an export covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    /// The filtered, sorted list (every page).
    #[default]
    Visible,
    /// Selected records, in sort order.
    Selected,
    /// The whole snapshot, in sort order, ignoring the filter.
    All,
}

/// Serializable UI state of one list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Ord"
))]
pub struct ViewState<T> {
    #[serde(default)]
    pub filter: FilterState<T>,
    #[serde(default)]
    pub sort: SortPolicy,
    #[serde(default)]
    pub paginator: Paginator,
    #[serde(default)]
    pub selection: SelectionSet,
    /// Last user-facing error, shown until cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            filter: FilterState::default(),
            sort: SortPolicy::default(),
            paginator: Paginator::default(),
            selection: SelectionSet::default(),
            error: None,
        }
    }
}

/// A snapshot of records and the list state shown for it.
#[derive(Debug, Clone)]
pub struct CollectionView<R: Record> {
    items: Vec<R>,
    state: ViewState<R::Tag>,
}

impl<R: Record> CollectionView<R> {
    /// A view with no filter, page 0 and an empty selection.
    #[must_use]
    pub fn new(items: Vec<R>, sort: SortPolicy) -> Self {
        Self {
            items,
            state: ViewState {
                sort,
                ..ViewState::default()
            },
        }
    }

    /// Restore a view from saved state, re-validating it against `items`.
    #[must_use]
    pub fn from_state(items: Vec<R>, state: ViewState<R::Tag>) -> Self {
        let mut view = Self { items, state };
        view.state.selection.prune(&view.items);
        view.clamp_page();
        view
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterState<R::Tag>) -> Self {
        self.state.filter = filter;
        self.clamp_page();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.state.paginator = Paginator::with_page_size(page_size);
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    #[must_use]
    pub const fn state(&self) -> &ViewState<R::Tag> {
        &self.state
    }

    #[must_use]
    pub const fn filter_state(&self) -> &FilterState<R::Tag> {
        &self.state.filter
    }

    #[must_use]
    pub const fn sort_policy(&self) -> &SortPolicy {
        &self.state.sort
    }

    #[must_use]
    pub const fn paginator(&self) -> &Paginator {
        &self.state.paginator
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.state.selection
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Filtered and sorted records, across all pages.
    #[must_use]
    pub fn visible(&self) -> Vec<&R> {
        sort(self.state.filter.apply(&self.items), &self.state.sort)
    }

    /// Records on the current page.
    #[must_use]
    pub fn current_page(&self) -> Vec<&R> {
        let visible = self.visible();
        self.state.paginator.slice(&visible).to_vec()
    }

    #[must_use]
    pub fn page_info(&self) -> PageInfo {
        self.state.paginator.page_info(self.visible().len())
    }

    /// Selected records in snapshot order.
    #[must_use]
    pub fn selected_records(&self) -> Vec<&R> {
        self.items
            .iter()
            .filter(|r| self.state.selection.contains(r.id()))
            .collect()
    }

    /// True when the visible list is non-empty and fully selected. Drives the
    /// tri-state "select all" checkbox.
    #[must_use]
    pub fn all_visible_selected(&self) -> bool {
        self.state.selection.all_selected(&self.visible())
    }

    /// "showing N of M" counts: visible records and snapshot size.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("showing {} of {}", self.visible().len(), self.items.len())
    }

    /// Render the records in `scope` as CSV.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] for an invalid delimiter.
    pub fn export_csv(&self, scope: ExportScope, options: &CsvOptions) -> Result<String, ExportError>
    where
        R: CsvRecord,
    {
        self.export_csv_with_names(scope, options, None)
    }

    /// Render the records in `scope` as CSV, resolving cross-references
    /// through `names` when given.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] for an invalid delimiter.
    pub fn export_csv_with_names(
        &self,
        scope: ExportScope,
        options: &CsvOptions,
        names: Option<&NameLookup>,
    ) -> Result<String, ExportError>
    where
        R: CsvRecord,
    {
        let records = self.records_in(scope);
        tracing::debug!(?scope, rows = records.len(), names = names.is_some(), "exporting csv");
        to_csv_string_with_names(records, options, names)
    }

    /// Records an export of `scope` would contain, in view order.
    #[must_use]
    pub fn records_in(&self, scope: ExportScope) -> Vec<&R> {
        match scope {
            ExportScope::Visible => self.visible(),
            ExportScope::Selected => sort(self.selected_records(), &self.state.sort),
            ExportScope::All => sort(self.items.iter().collect(), &self.state.sort),
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    /// Swap in a fresh snapshot. Selections of records that disappeared are
    /// dropped.
    pub fn replace_items(&mut self, items: Vec<R>) {
        self.items = items;
        let pruned = self.state.selection.prune(&self.items);
        if pruned > 0 {
            tracing::debug!(pruned, "dropped selections of removed records");
        }
        self.clamp_page();
    }

    // -----------------------------------------------------------------------
    // Filter
    // -----------------------------------------------------------------------

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.filter.query = query.into();
        tracing::debug!(query = %self.state.filter.query, "query changed");
        self.clamp_page();
    }

    /// Set a per-field condition. A blank query removes it.
    pub fn set_field_query(&mut self, field: TextField, query: impl Into<String>) {
        let query = query.into();
        if query.trim().is_empty() {
            self.state.filter.field_queries.remove(&field);
        } else {
            self.state.filter.field_queries.insert(field, query);
        }
        self.clamp_page();
    }

    /// Returns whether the tag is now allowed.
    pub fn toggle_tag(&mut self, tag: R::Tag) -> bool {
        let allowed = self.state.filter.toggle_tag(tag);
        tracing::debug!(?tag, allowed, "tag filter toggled");
        self.clamp_page();
        allowed
    }

    pub fn clear_tags(&mut self) {
        self.state.filter.tags.clear();
        self.clamp_page();
    }

    pub fn require_flag(&mut self, flag: Flag, value: bool) {
        self.state.filter.flags.insert(flag, value);
        self.clamp_page();
    }

    pub fn clear_flag(&mut self, flag: Flag) {
        self.state.filter.flags.remove(&flag);
        self.clamp_page();
    }

    pub fn set_include_inactive(&mut self, include: bool) {
        self.state.filter.set_include_inactive(include);
        self.clamp_page();
    }

    pub fn set_date_condition(&mut self, condition: Option<DateCondition>) {
        self.state.filter.date = condition;
        self.clamp_page();
    }

    /// Drop every filter condition and go back to the first page.
    pub fn reset_filters(&mut self) {
        self.state.filter = FilterState::default();
        self.state.paginator.first_page();
    }

    pub fn set_sort(&mut self, policy: SortPolicy) {
        self.state.sort = policy;
    }

    // -----------------------------------------------------------------------
    // Paging
    // -----------------------------------------------------------------------

    pub fn next_page(&mut self) -> bool {
        let len = self.visible().len();
        self.state.paginator.next_page(len)
    }

    pub fn prev_page(&mut self) -> bool {
        self.state.paginator.prev_page()
    }

    /// Jump to a page, clamped to the last one.
    pub fn go_to_page(&mut self, page: usize) {
        let len = self.visible().len();
        self.state.paginator.first_page();
        for _ in 0..page {
            if !self.state.paginator.next_page(len) {
                break;
            }
        }
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        let len = self.visible().len();
        self.state.paginator.set_page_size(page_size, len);
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Flip one record's selection. Identities outside the snapshot are
    /// ignored. Returns whether the record is selected afterwards.
    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if !self.items.iter().any(|r| r.id() == id) {
            return false;
        }
        self.state.selection.toggle(id)
    }

    pub fn toggle_all_visible(&mut self) {
        let visible = self.state.filter.apply(&self.items);
        self.state.selection.toggle_all_visible(&visible);
    }

    pub fn invert_visible(&mut self) {
        let visible = self.state.filter.apply(&self.items);
        self.state.selection.invert_visible(&visible);
    }

    pub fn invert_all(&mut self) {
        self.state.selection.invert_all(&self.items);
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Apply `action` to the current selection through `backend`.
    ///
    /// Failures are collapsed into the view's error message. The selection
    /// is cleared after destructive actions, whether or not every item
    /// succeeded. The snapshot is not touched: reload it with
    /// [`replace_items`](Self::replace_items) once the backend has persisted
    /// the change.
    pub fn run_batch(&mut self, action: &BatchAction, backend: &mut dyn RecordActions) -> BatchReport {
        let report = batch::run_batch(&self.state.selection, action, backend);
        self.state.error = report.error_message();
        if action.is_destructive() {
            self.state.selection.clear();
        }
        report
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    fn clamp_page(&mut self) {
        let len = self.visible().len();
        if self.state.paginator.clamp(len) {
            tracing::debug!(page = self.state.paginator.page(), len, "page clamped");
        }
    }
}
