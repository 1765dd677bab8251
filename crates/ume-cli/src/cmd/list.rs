//! `ume list`: filter, sort and page a record snapshot.

use super::{Collection, FilterArgs, build_view, load_names};
use crate::output::{OutputMode, heading, page_footer, record_table, render_mode};
use clap::Args;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use ume_core::config::UmeConfig;
use ume_core::export::{columns, row};
use ume_core::model::{Center, Notification, Task, User};
use ume_core::{CsvRecord, NameLookup, PageInfo, Record};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Which kind of records the snapshot holds.
    #[arg(value_enum)]
    pub collection: Collection,

    /// JSON array of records.
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Page to show, starting at 1. Pages past the end are empty.
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Rows per page (defaults to `list.page_size` from config).
    #[arg(long)]
    pub page_size: Option<usize>,

    /// JSON object of ID to display name, used to show who a task is for.
    #[arg(long, value_name = "PATH")]
    pub names: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ListReport<'a, R> {
    collection: &'static str,
    summary: String,
    page: PageInfo,
    items: Vec<&'a R>,
    /// Display names of the records the shown items point at.
    #[serde(skip_serializing_if = "Option::is_none")]
    names: Option<BTreeMap<&'a str, &'a str>>,
    #[serde(skip)]
    lookup: Option<&'a NameLookup>,
}

impl<'a, R: CsvRecord> ListReport<'a, R> {
    fn referenced_names(items: &[&'a R], lookup: &'a NameLookup) -> BTreeMap<&'a str, &'a str> {
        items
            .iter()
            .filter_map(|item| item.reference_id())
            .filter_map(|id| lookup.get_key_value(id))
            .map(|(id, name)| (id.as_str(), name.as_str()))
            .collect()
    }
}

pub fn run_list(args: &ListArgs, config: &UmeConfig, output: OutputMode) -> anyhow::Result<()> {
    match args.collection {
        Collection::Users => list_records::<User>(args, config, output),
        Collection::Centers => list_records::<Center>(args, config, output),
        Collection::Tasks => list_records::<Task>(args, config, output),
        Collection::Notifications => list_records::<Notification>(args, config, output),
    }
}

fn list_records<R>(args: &ListArgs, config: &UmeConfig, output: OutputMode) -> anyhow::Result<()>
where
    R: Record + CsvRecord + Serialize + DeserializeOwned,
{
    let mut view = build_view::<R>(
        &args.file,
        args.collection,
        &args.filters,
        args.page_size,
        config,
        output,
    )?;
    let lookup = load_names(args.names.as_deref(), output)?;
    let requested = args.page.saturating_sub(1);
    view.go_to_page(requested);

    // go_to_page stops at the last page; a page past the end is shown empty
    // under its own number.
    let (page, items) = if view.paginator().page() == requested {
        (view.page_info(), view.current_page())
    } else {
        let len = view.visible().len();
        (view.paginator().page_info_for(requested, len), Vec::new())
    };
    let names = lookup
        .as_ref()
        .filter(|_| R::REFERENCE.is_some())
        .map(|lookup| ListReport::referenced_names(&items, lookup));
    let report = ListReport {
        collection: args.collection.as_str(),
        summary: view.summary(),
        page,
        items,
        names,
        lookup: lookup.as_ref(),
    };
    tracing::debug!(shown = report.items.len(), "list rendered");

    render_mode(output, &report, render_text, render_pretty)
}

fn render_text<R: CsvRecord>(report: &ListReport<'_, R>, w: &mut dyn Write) -> io::Result<()> {
    let rows = report.items.iter().map(|record| row(*record, report.lookup));
    record_table(w, &columns::<R>(report.lookup), rows, "\t")
}

fn render_pretty<R: CsvRecord>(report: &ListReport<'_, R>, w: &mut dyn Write) -> io::Result<()> {
    heading(w, &format!("{} ({})", report.collection, report.summary))?;
    if report.items.is_empty() {
        writeln!(w, "No records on this page.")?;
    } else {
        let rows = report.items.iter().map(|record| row(*record, report.lookup));
        record_table(w, &columns::<R>(report.lookup), rows, "  ")?;
    }
    page_footer(w, &report.page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn list_args_defaults() {
        let w = Wrapper::parse_from(["test", "users", "--file", "users.json"]);
        assert_eq!(w.args.collection, Collection::Users);
        assert_eq!(w.args.page, 1);
        assert!(w.args.page_size.is_none());
        assert!(w.args.names.is_none());
        assert!(w.args.filters.query.is_none());
        assert!(!w.args.filters.include_inactive);
    }

    #[test]
    fn list_args_filters() {
        let w = Wrapper::parse_from([
            "test",
            "tasks",
            "-f",
            "tasks.json",
            "--field",
            "title=math",
            "--tag",
            "pending",
            "--tag",
            "in_progress",
            "--overdue",
            "--as-of",
            "2024-09-15T00:00:00Z",
            "--page",
            "2",
        ]);
        assert_eq!(w.args.collection, Collection::Tasks);
        assert_eq!(w.args.filters.fields, vec!["title=math"]);
        assert_eq!(w.args.filters.tags.len(), 2);
        assert!(w.args.filters.overdue);
        assert!(w.args.filters.as_of.is_some());
        assert_eq!(w.args.page, 2);
    }

    #[test]
    fn text_rows_replace_tabs_and_newlines() {
        let mut user = User::new("X1", "Ann\tMarie");
        user.phone = "1\n2".into();
        let report = ListReport {
            collection: "users",
            summary: String::new(),
            page: PageInfo {
                page: 0,
                total_pages: 1,
                total_items: 1,
                first_row: 1,
                last_row: 1,
            },
            items: vec![&user],
            names: None,
            lookup: None,
        };
        let mut buf = Vec::new();
        render_text(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "X1\tAnn Marie\t\t\t1 2\t\ttrue");
    }

    #[test]
    fn task_rows_gain_student_column_with_names() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t-1", "title": "Fractions", "student_id": "S1"
        }))
        .unwrap();
        let lookup = NameLookup::from([("S1".to_string(), "Ane Garcia".to_string())]);
        let items = vec![&task];
        let report = ListReport {
            collection: "tasks",
            summary: String::new(),
            page: PageInfo {
                page: 0,
                total_pages: 1,
                total_items: 1,
                first_row: 1,
                last_row: 1,
            },
            names: Some(ListReport::referenced_names(&items, &lookup)),
            items,
            lookup: Some(&lookup),
        };

        let mut buf = Vec::new();
        render_text(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().ends_with("\tstudent"));
        assert!(lines.next().unwrap().ends_with("\tAne Garcia"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["names"], serde_json::json!({ "S1": "Ane Garcia" }));
    }
}
