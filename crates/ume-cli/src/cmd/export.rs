//! `ume export`: write a snapshot's visible, selected or whole record set
//! as CSV.

use super::{Collection, FilterArgs, build_view, load_names};
use crate::output::{CliError, OutputMode, fail, field, render_mode};
use clap::Args;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::path::PathBuf;
use ume_core::config::UmeConfig;
use ume_core::error::ErrorCode;
use ume_core::model::{Center, Notification, Task, User};
use ume_core::{CollectionView, CsvRecord, ExportScope, Record};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Which kind of records the snapshot holds.
    #[arg(value_enum)]
    pub collection: Collection,

    /// JSON array of records.
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Export only these record IDs. Repeatable.
    #[arg(long = "selected", value_name = "ID", conflicts_with = "all")]
    pub selected: Vec<String>,

    /// Export the whole snapshot, ignoring filters.
    #[arg(long)]
    pub all: bool,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// JSON object of ID to display name. Adds a `student` column to tasks.
    #[arg(long, value_name = "PATH")]
    pub names: Option<PathBuf>,
}

impl ExportArgs {
    fn scope(&self) -> ExportScope {
        if !self.selected.is_empty() {
            ExportScope::Selected
        } else if self.all {
            ExportScope::All
        } else {
            ExportScope::Visible
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportSummary {
    collection: &'static str,
    scope: ExportScope,
    rows: usize,
    output: String,
}

pub fn run_export(args: &ExportArgs, config: &UmeConfig, output: OutputMode) -> anyhow::Result<()> {
    match args.collection {
        Collection::Users => export_records::<User>(args, config, output),
        Collection::Centers => export_records::<Center>(args, config, output),
        Collection::Tasks => export_records::<Task>(args, config, output),
        Collection::Notifications => export_records::<Notification>(args, config, output),
    }
}

fn export_records<R>(args: &ExportArgs, config: &UmeConfig, output: OutputMode) -> anyhow::Result<()>
where
    R: Record + CsvRecord + DeserializeOwned,
{
    let mut view = build_view::<R>(&args.file, args.collection, &args.filters, None, config, output)?;
    select_ids(&mut view, &args.selected, output)?;
    let names = load_names(args.names.as_deref(), output)?;

    let scope = args.scope();
    let csv = view
        .export_csv_with_names(scope, &config.export, names.as_ref())
        .map_err(|e| fail(output, &CliError::from_code(ErrorCode::ExportFailed, e.to_string())))?;
    let rows = view.records_in(scope).len();

    let Some(path) = &args.output else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(csv.as_bytes())?;
        out.flush()?;
        return Ok(());
    };

    std::fs::write(path, &csv).map_err(|e| {
        fail(
            output,
            &CliError::from_code(
                ErrorCode::ExportFailed,
                format!("failed to write {}: {e}", path.display()),
            ),
        )
    })?;
    tracing::info!(path = %path.display(), rows, "csv written");

    let summary = ExportSummary {
        collection: args.collection.as_str(),
        scope,
        rows,
        output: path.display().to_string(),
    };
    render_mode(output, &summary, render_summary, render_summary)
}

fn render_summary(summary: &ExportSummary, w: &mut dyn Write) -> io::Result<()> {
    field(w, "exported", format_args!("{} {}", summary.rows, summary.collection))?;
    field(w, "file", &summary.output)
}

/// Mark `ids` as selected. Every ID must exist in the snapshot.
pub(crate) fn select_ids<R: Record>(
    view: &mut CollectionView<R>,
    ids: &[String],
    output: OutputMode,
) -> anyhow::Result<()> {
    for id in ids {
        if view.selection().contains(id) {
            continue;
        }
        if !view.toggle_selected(id) {
            return Err(fail(
                output,
                &CliError::from_code(ErrorCode::RecordNotFound, format!("record '{id}' not found")),
            ));
        }
    }
    Ok(())
}
