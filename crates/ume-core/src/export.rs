//! CSV export of record lists.
//!
//! Output is one header row followed by one row per record, quoted per
//! RFC 4180 so embedded delimiters, quotes and line breaks survive a round
//! trip through a spreadsheet.

use crate::error::ExportError;
use crate::model::{Center, Notification, TagKind, Task, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;

/// Display names keyed by record ID, loaded by the caller alongside a
/// snapshot.
pub type NameLookup = BTreeMap<String, String>;

/// A record with a fixed column layout.
pub trait CsvRecord {
    /// Column names, in the order [`csv_fields`](Self::csv_fields) yields
    /// values.
    const HEADERS: &'static [&'static str];

    /// Header of the extra column that shows the display name of the record
    /// this one points at. Only written when names are supplied.
    const REFERENCE: Option<&'static str> = None;

    fn csv_fields(&self) -> Vec<Cow<'_, str>>;

    /// ID looked up in a [`NameLookup`] for the [`REFERENCE`](Self::REFERENCE)
    /// column.
    fn reference_id(&self) -> Option<&str> {
        None
    }
}

/// Column names for `R`, with the reference column appended when `names`
/// is given and `R` has one.
#[must_use]
pub fn columns<R: CsvRecord>(names: Option<&NameLookup>) -> Vec<&'static str> {
    let mut headers = R::HEADERS.to_vec();
    if let (Some(_), Some(reference)) = (names, R::REFERENCE) {
        headers.push(reference);
    }
    headers
}

/// Field values of `record` in [`columns`] order. An ID missing from
/// `names` renders as an empty cell.
#[must_use]
pub fn row<'a, R: CsvRecord>(record: &'a R, names: Option<&'a NameLookup>) -> Vec<Cow<'a, str>> {
    let mut fields = record.csv_fields();
    if let (Some(names), Some(_)) = (names, R::REFERENCE) {
        let name = record
            .reference_id()
            .and_then(|id| names.get(id))
            .map_or("", String::as_str);
        fields.push(Cow::Borrowed(name));
    }
    fields
}

/// Writer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl CsvOptions {
    /// # Errors
    ///
    /// Returns [`ExportError::Delimiter`] for a non-ASCII or line-break
    /// delimiter.
    pub fn delimiter_byte(&self) -> Result<u8, ExportError> {
        let c = self.delimiter;
        if !c.is_ascii() || matches!(c, '\n' | '\r' | '"') {
            return Err(ExportError::Delimiter(c));
        }
        u8::try_from(c).map_err(|_| ExportError::Delimiter(c))
    }
}

/// Write `records` as CSV. Returns the number of data rows written.
///
/// # Errors
///
/// Returns an [`ExportError`] on an invalid delimiter or when the
/// underlying writer fails.
pub fn write_csv<'a, W, R, I>(writer: W, records: I, options: &CsvOptions) -> Result<usize, ExportError>
where
    W: io::Write,
    R: CsvRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    write_csv_with_names(writer, records, options, None)
}

/// [`write_csv`], plus the reference column resolved through `names` when
/// given.
///
/// # Errors
///
/// Returns an [`ExportError`] on an invalid delimiter or when the
/// underlying writer fails.
pub fn write_csv_with_names<'a, W, R, I>(
    writer: W,
    records: I,
    options: &CsvOptions,
    names: Option<&NameLookup>,
) -> Result<usize, ExportError>
where
    W: io::Write,
    R: CsvRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(options.delimiter_byte()?)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(columns::<R>(names))?;
    let mut rows = 0;
    for record in records {
        wtr.write_record(row(record, names).iter().map(|f| f.as_bytes()))?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

/// Render `records` as a CSV string.
///
/// # Errors
///
/// Returns an [`ExportError`] on an invalid delimiter.
pub fn to_csv_string<'a, R, I>(records: I, options: &CsvOptions) -> Result<String, ExportError>
where
    R: CsvRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    to_csv_string_with_names(records, options, None)
}

/// # Errors
///
/// Returns an [`ExportError`] on an invalid delimiter.
pub fn to_csv_string_with_names<'a, R, I>(
    records: I,
    options: &CsvOptions,
    names: Option<&NameLookup>,
) -> Result<String, ExportError>
where
    R: CsvRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut buf = Vec::new();
    write_csv_with_names(&mut buf, records, options, names)?;
    Ok(String::from_utf8(buf)?)
}

fn epoch_seconds(at: Option<DateTime<Utc>>) -> Cow<'static, str> {
    at.map_or(Cow::Borrowed(""), |t| Cow::Owned(t.timestamp().to_string()))
}

const fn yes_no(value: bool) -> Cow<'static, str> {
    Cow::Borrowed(if value { "true" } else { "false" })
}

impl CsvRecord for User {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "name",
        "surname",
        "email",
        "phone",
        "registered_at",
        "active",
    ];

    fn csv_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.id),
            Cow::Borrowed(&self.name),
            Cow::Borrowed(&self.surname),
            Cow::Borrowed(&self.email),
            Cow::Borrowed(&self.phone),
            epoch_seconds(self.registered_at),
            yes_no(self.active),
        ]
    }
}

impl CsvRecord for Center {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "name",
        "city",
        "province",
        "phone",
        "email",
        "created_at",
        "active",
    ];

    fn csv_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.id),
            Cow::Borrowed(&self.name),
            Cow::Borrowed(&self.address.city),
            Cow::Borrowed(&self.address.province),
            Cow::Borrowed(&self.phone),
            Cow::Borrowed(&self.email),
            epoch_seconds(self.created_at),
            yes_no(self.active),
        ]
    }
}

impl CsvRecord for Task {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "title",
        "subject",
        "student_id",
        "status",
        "created_at",
        "due_at",
    ];

    const REFERENCE: Option<&'static str> = Some("student");

    fn csv_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.id),
            Cow::Borrowed(&self.title),
            Cow::Borrowed(&self.subject),
            Cow::Borrowed(self.student_id.as_deref().unwrap_or("")),
            Cow::Borrowed(self.status.key()),
            epoch_seconds(self.created_at),
            epoch_seconds(self.due_at),
        ]
    }

    fn reference_id(&self) -> Option<&str> {
        self.student_id.as_deref()
    }
}

impl CsvRecord for Notification {
    const HEADERS: &'static [&'static str] = &["id", "kind", "title", "body", "read", "created_at"];

    fn csv_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.id),
            Cow::Borrowed(self.kind.key()),
            Cow::Borrowed(&self.title),
            Cow::Borrowed(&self.body),
            yes_no(self.read),
            epoch_seconds(self.created_at),
        ]
    }
}
