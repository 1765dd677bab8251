pub mod batch;
pub mod export;
pub mod list;
pub mod password;

use crate::output::{CliError, OutputMode, fail};
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;
use std::path::Path;
use ume_core::config::UmeConfig;
use ume_core::error::ErrorCode;
use ume_core::model::TagKind;
use ume_core::{
    CollectionView, DateCondition, Flag, FilterState, NameLookup, Paginator, Record, SortPolicy,
    TextField, TimeField,
};

/// Record collections a snapshot file can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Users,
    Centers,
    Tasks,
    Notifications,
}

impl Collection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Centers => "centers",
            Self::Tasks => "tasks",
            Self::Notifications => "notifications",
        }
    }

    /// Only collections with an active flag hide inactive records.
    const fn has_active_flag(self) -> bool {
        matches!(self, Self::Users | Self::Centers)
    }

    /// Screen default ordering.
    pub fn default_sort(self) -> SortPolicy {
        match self {
            Self::Users | Self::Centers => SortPolicy::active_first_by_name(),
            Self::Tasks => SortPolicy::by_due_date(),
            Self::Notifications => SortPolicy::newest_first(TimeField::Created),
        }
    }
}

/// Filter and sort flags shared by `list`, `export` and `batch`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Free-text search over the collection's search fields.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Per-field substring filter, e.g. `--field surname=garcia`. Repeatable.
    #[arg(long = "field", value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,

    /// Keep only records with this tag (user kind, task status, notification
    /// kind). Repeatable; tags are ORed.
    #[arg(short, long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Show inactive users and centers.
    #[arg(long)]
    pub include_inactive: bool,

    /// Keep only unread notifications.
    #[arg(long)]
    pub unread: bool,

    /// Keep only tasks past their due date and not completed.
    #[arg(long)]
    pub overdue: bool,

    /// Reference instant for `--overdue` (RFC 3339). Defaults to now.
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<DateTime<Utc>>,

    /// Sort keys, e.g. `active:desc,name` (defaults to the screen order).
    #[arg(long, value_name = "KEYS")]
    pub sort: Option<String>,
}

impl FilterArgs {
    /// Build the filter state for records tagged with `T`.
    fn filter_state<T: TagKind>(
        &self,
        collection: Collection,
        config: &UmeConfig,
        output: OutputMode,
    ) -> anyhow::Result<FilterState<T>> {
        let mut state = FilterState::<T> {
            query: self.query.clone().unwrap_or_default(),
            ..FilterState::default()
        };

        for raw in &self.fields {
            let Some((field, value)) = raw.split_once('=') else {
                return Err(fail(
                    output,
                    &CliError::new(format!("invalid --field '{raw}': expected FIELD=VALUE")),
                ));
            };
            let field = field.parse::<TextField>().map_err(|e| {
                fail(output, &CliError::from_code(ErrorCode::InvalidTag, e.to_string()))
            })?;
            state.field_queries.insert(field, value.to_string());
        }

        for raw in &self.tags {
            let tag = T::parse_tag(raw).map_err(|e| {
                fail(output, &CliError::from_code(ErrorCode::InvalidTag, e.to_string()))
            })?;
            state.tags.insert(tag);
        }

        if collection.has_active_flag() {
            state.set_include_inactive(self.include_inactive || config.list.include_inactive);
        }
        if self.unread {
            state.flags.insert(Flag::Read, false);
        }
        if self.overdue {
            state.date = Some(DateCondition::Overdue {
                as_of: self.as_of.unwrap_or_else(Utc::now),
            });
        }
        Ok(state)
    }

    fn sort_policy(&self, collection: Collection, output: OutputMode) -> anyhow::Result<SortPolicy> {
        match &self.sort {
            None => Ok(collection.default_sort()),
            Some(raw) => raw
                .parse::<SortPolicy>()
                .map_err(|e| fail(output, &CliError::new(format!("invalid --sort: {e}")))),
        }
    }
}

/// Read a JSON array of records.
pub fn load_records<R: DeserializeOwned>(path: &Path, output: OutputMode) -> anyhow::Result<Vec<R>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()));
    let parsed = content.and_then(|content| {
        serde_json::from_str::<Vec<R>>(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    });
    parsed.map_err(|e| {
        fail(
            output,
            &CliError::from_code(ErrorCode::SnapshotUnreadable, format!("{e:#}")),
        )
    })
}

/// Read an optional `--names` file: a JSON object mapping record IDs to
/// display names.
pub fn load_names(path: Option<&Path>, output: OutputMode) -> anyhow::Result<Option<NameLookup>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()));
    let parsed = content.and_then(|content| {
        serde_json::from_str::<NameLookup>(&content)
            .with_context(|| format!("failed to parse names in {}", path.display()))
    });
    let names = parsed.map_err(|e| {
        fail(
            output,
            &CliError::from_code(ErrorCode::SnapshotUnreadable, format!("{e:#}")),
        )
    })?;
    tracing::debug!(path = %path.display(), names = names.len(), "names loaded");
    Ok(Some(names))
}

/// Load a snapshot and apply the filter, sort and page size flags.
pub fn build_view<R>(
    path: &Path,
    collection: Collection,
    filters: &FilterArgs,
    page_size: Option<usize>,
    config: &UmeConfig,
    output: OutputMode,
) -> anyhow::Result<CollectionView<R>>
where
    R: Record + DeserializeOwned,
{
    let items: Vec<R> = load_records(path, output)?;
    view_of(items, collection, filters, page_size, config, output)
}

/// Wrap already-loaded records in a view configured from the command flags.
pub fn view_of<R: Record>(
    items: Vec<R>,
    collection: Collection,
    filters: &FilterArgs,
    page_size: Option<usize>,
    config: &UmeConfig,
    output: OutputMode,
) -> anyhow::Result<CollectionView<R>> {
    let state = filters.filter_state::<R::Tag>(collection, config, output)?;
    let sort = filters.sort_policy(collection, output)?;

    let paginator = Paginator::new(page_size.unwrap_or(config.list.page_size))
        .map_err(|e| fail(output, &CliError::from_code(e.error_code(), e.to_string())))?;

    tracing::debug!(
        collection = collection.as_str(),
        records = items.len(),
        "snapshot loaded"
    );
    Ok(CollectionView::new(items, sort)
        .with_filter(state)
        .with_page_size(paginator.page_size()))
}
