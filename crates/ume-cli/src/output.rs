//! Rendering for `ume`: output mode selection, record tables, page
//! footers, batch reports and errors.
//!
//! JSON output is always the serde form of a command's report. Pretty and
//! text output go through the writers below, which take `&mut dyn Write`
//! so tests can render into a buffer.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"` (any case)
//! 3. [`OutputMode::Pretty`] if stdout is a terminal, [`OutputMode::Text`]
//!    otherwise.

use clap::ValueEnum;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use ume_core::error::ErrorCode;
use ume_core::{BatchReport, PageInfo};

const RULE_WIDTH: usize = 72;
const KEY_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Headings, aligned fields and page footers for a terminal.
    Pretty,
    /// Header line plus one line per record, for pipes.
    Text,
    Json,
}

impl OutputMode {
    pub fn resolve(flag: Option<Self>, json: bool) -> Self {
        let env = std::env::var("FORMAT").ok();
        Self::pick(flag, json, env.as_deref(), io::stdout().is_terminal())
    }

    fn pick(flag: Option<Self>, json: bool, env: Option<&str>, tty: bool) -> Self {
        flag.or_else(|| json.then_some(Self::Json))
            .or_else(|| env.and_then(|value| <Self as ValueEnum>::from_str(value, true).ok()))
            .unwrap_or(if tty { Self::Pretty } else { Self::Text })
    }
}

// ---------------------------------------------------------------------------
// Pretty building blocks
// ---------------------------------------------------------------------------

pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

pub fn heading(w: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(w, "{title}")?;
    rule(w)
}

/// `key:` padded to a fixed column, then the value.
pub fn field(w: &mut dyn Write, key: &str, value: impl Display) -> io::Result<()> {
    writeln!(w, "{:<width$} {value}", format!("{key}:"), width = KEY_WIDTH)
}

/// Header line and one line per record, cells joined by `sep`. Tabs and
/// line breaks inside a cell become spaces. Writes nothing for no rows.
pub fn record_table<'a, I>(w: &mut dyn Write, headers: &[&str], rows: I, sep: &str) -> io::Result<()>
where
    I: IntoIterator<Item = Vec<Cow<'a, str>>>,
{
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        return Ok(());
    }
    writeln!(w, "{}", headers.join(sep))?;
    for cells in rows {
        let line: Vec<String> = cells
            .iter()
            .map(|cell| cell.replace(['\t', '\n', '\r'], " "))
            .collect();
        writeln!(w, "{}", line.join(sep))?;
    }
    Ok(())
}

/// Footer under a list page. Pages past the end show "none" rows.
pub fn page_footer(w: &mut dyn Write, page: &PageInfo) -> io::Result<()> {
    rule(w)?;
    field(
        w,
        "page",
        format_args!("{} of {}", page.page.saturating_add(1), page.total_pages),
    )?;
    if page.last_row == 0 {
        field(w, "rows", format_args!("none of {}", page.total_items))
    } else {
        field(
            w,
            "rows",
            format_args!("{}-{} of {}", page.first_row, page.last_row, page.total_items),
        )
    }
}

/// Summary heading, then one line per record the action touched.
pub fn batch_report(w: &mut dyn Write, report: &BatchReport) -> io::Result<()> {
    heading(w, &report.summary())?;
    for id in &report.succeeded {
        writeln!(w, "  ok      {id}")?;
    }
    for failure in &report.failed {
        writeln!(w, "  failed  {}: {}", failure.id, failure.message)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Write `report` to stdout as JSON, or through the text or pretty writer.
pub fn render_mode<T: Serialize + ?Sized>(
    mode: OutputMode,
    report: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(report, &mut out)?,
        OutputMode::Pretty => pretty(report, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

/// A value listed one per line: a table row in text mode, its own block in
/// pretty mode, an array element in JSON.
pub trait Row: Serialize {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<Cow<'_, str>>;

    fn pretty(&self, w: &mut dyn Write) -> io::Result<()>;
}

pub fn render_rows<R: Row>(mode: OutputMode, rows: &[R]) -> anyhow::Result<()> {
    render_mode(
        mode,
        rows,
        |rows, w| record_table(w, R::COLUMNS, rows.iter().map(R::cells), "  "),
        |rows, w| rows.iter().try_for_each(|row| row.pretty(w)),
    )
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failure shown to the user, with an optional fix and library code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// e.g. "E2001"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// An error carrying a library error code and its hint.
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// JSON mode wraps the error as `{"error": {...}}`; other modes print
/// `error: ...` and an indented suggestion.
fn write_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> io::Result<()> {
    if mode == OutputMode::Json {
        serde_json::to_writer_pretty(&mut *w, &serde_json::json!({ "error": error }))?;
        return writeln!(w);
    }
    writeln!(w, "error: {}", error.message)?;
    match &error.suggestion {
        Some(suggestion) => writeln!(w, "  suggestion: {suggestion}"),
        None => Ok(()),
    }
}

/// Print `error` to stderr and turn it into the command's failure.
pub fn fail(mode: OutputMode, error: &CliError) -> anyhow::Error {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match write_error(&mut out, mode, error) {
        Ok(()) => anyhow::anyhow!("{}", error.message),
        Err(e) => e.into(),
    }
}
