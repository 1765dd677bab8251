#![forbid(unsafe_code)]
//! ume-core library.
//!
//! In-memory list engine shared by the UmeEgunero list screens: a snapshot of
//! records flows through [`filter`] -> [`sort`] -> [`page`], with a
//! [`selection`] tracked over the visible rows and [`batch`] actions handed to
//! a caller-supplied backend. [`view::CollectionView`] owns that state for a
//! single screen.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per concern; see [`error`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod model;
pub mod page;
pub mod password;
pub mod selection;
pub mod sort;
pub mod view;

pub use batch::{BatchAction, BatchReport, RecordActions, run_batch};
pub use config::UmeConfig;
pub use export::{
    CsvOptions, CsvRecord, NameLookup, to_csv_string, to_csv_string_with_names, write_csv,
    write_csv_with_names,
};
pub use filter::{DateCondition, FilterState, filter};
pub use model::{Flag, Record, TextField, TimeField};
pub use page::{PageInfo, Paginator, paginate, total_pages};
pub use password::{Credential, PasswordPolicy, Strength, evaluate_strength};
pub use selection::SelectionSet;
pub use sort::{Direction, SortField, SortKey, SortPolicy, sort};
pub use view::{CollectionView, ExportScope, ViewState};
