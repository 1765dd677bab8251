//! Record model shared by every list screen.
//!
//! A [`Record`] is anything the list engine can filter, sort and page: it
//! exposes an identity plus typed accessors for the text, tag, flag and
//! timestamp keys the engine works on. Concrete records live in the
//! submodules.

pub mod center;
pub mod notification;
pub mod task;
pub mod user;

pub use center::{Address, Center};
pub use notification::{Notification, NotificationKind};
pub use task::{Task, TaskStatus};
pub use user::{Profile, User, UserKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Key selectors
// ---------------------------------------------------------------------------

/// String-valued attributes a record may expose for search and sort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Name,
    Surname,
    /// Name and surname joined by a space.
    FullName,
    Email,
    /// National ID, document key or other external identifier.
    Identifier,
    Phone,
    Title,
    Body,
    /// City and province.
    Location,
}

impl TextField {
    pub const ALL: [Self; 9] = [
        Self::Name,
        Self::Surname,
        Self::FullName,
        Self::Email,
        Self::Identifier,
        Self::Phone,
        Self::Title,
        Self::Body,
        Self::Location,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Surname => "surname",
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Identifier => "identifier",
            Self::Phone => "phone",
            Self::Title => "title",
            Self::Body => "body",
            Self::Location => "location",
        }
    }
}

/// Boolean status flags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Active,
    Read,
    Confirmed,
    Completed,
}

impl Flag {
    pub const ALL: [Self; 4] = [Self::Active, Self::Read, Self::Confirmed, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Read => "read",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
        }
    }
}

/// Timestamp-valued attributes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    Created,
    Due,
}

impl TimeField {
    pub const ALL: [Self; 2] = [Self::Created, Self::Due];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Due => "due",
        }
    }
}

macro_rules! selector_str_impls {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        ParseValueError::new($what, s, Self::ALL.iter().map(|v| v.as_str()))
                    })
            }
        }
    };
}

selector_str_impls!(TextField, "text field");
selector_str_impls!(Flag, "flag");
selector_str_impls!(TimeField, "time field");

/// Returned when a selector or tag name does not match any known value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} '{value}': expected one of {expected}")]
pub struct ParseValueError {
    pub what: &'static str,
    pub value: String,
    pub expected: String,
}

impl ParseValueError {
    fn new<'a>(what: &'static str, value: &str, expected: impl Iterator<Item = &'a str>) -> Self {
        Self {
            what,
            value: value.to_string(),
            expected: expected.collect::<Vec<_>>().join(", "),
        }
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Presentation data for one tag variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    /// Stable machine key (serde name, CLI value).
    pub key: &'static str,
    /// Human label shown in lists and filter chips.
    pub label: &'static str,
    /// Icon name used by the rendering layer.
    pub icon: &'static str,
    /// Accent colour as `0xRRGGBB`.
    pub color: u32,
}

/// A categorical tag enumeration.
///
/// Implementors back [`TagKind::info`] with a static table indexed by
/// variant, so adding a category means adding one table row.
pub trait TagKind: Copy + Ord + fmt::Debug + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];
    /// Name used in error messages.
    const WHAT: &'static str;

    fn info(self) -> &'static TagInfo;

    fn key(self) -> &'static str {
        self.info().key
    }

    fn label(self) -> &'static str {
        self.info().label
    }

    /// Parse a tag from its key or label, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`ParseValueError`] when no variant matches.
    fn parse_tag(raw: &str) -> Result<Self, ParseValueError> {
        let wanted = raw.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.key() == wanted || t.label().to_lowercase() == wanted)
            .ok_or_else(|| ParseValueError::new(Self::WHAT, raw, Self::ALL.iter().map(|t| t.key())))
    }
}

/// Tag type for records that carry no category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoTag {}

impl TagKind for NoTag {
    const ALL: &'static [Self] = &[];
    const WHAT: &'static str = "tag";

    fn info(self) -> &'static TagInfo {
        match self {}
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A row the list engine can filter, sort, page and select.
pub trait Record {
    type Tag: TagKind;

    /// Fields matched by the free-text query unless a filter overrides them.
    const SEARCH_FIELDS: &'static [TextField];

    /// Identity, unique within a snapshot.
    fn id(&self) -> &str;

    /// Value of a text attribute, or `None` when the record has no such field.
    fn text(&self, field: TextField) -> Option<Cow<'_, str>>;

    fn tag(&self) -> Option<Self::Tag> {
        None
    }

    fn flag(&self, _flag: Flag) -> Option<bool> {
        None
    }

    fn timestamp(&self, _field: TimeField) -> Option<DateTime<Utc>> {
        None
    }
}

/// Join two name parts, skipping empty ones.
pub(crate) fn join_name<'a>(first: &'a str, last: &'a str) -> Cow<'a, str> {
    match (first.is_empty(), last.is_empty()) {
        (_, true) => Cow::Borrowed(first),
        (true, false) => Cow::Borrowed(last),
        (false, false) => Cow::Owned(format!("{first} {last}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_round_trip_through_strings() {
        for field in TextField::ALL {
            assert_eq!(field.to_string().parse::<TextField>(), Ok(field));
        }
        for flag in Flag::ALL {
            assert_eq!(flag.to_string().parse::<Flag>(), Ok(flag));
        }
        assert_eq!("full-name".parse::<TextField>(), Ok(TextField::FullName));
        assert_eq!(" DUE ".parse::<TimeField>(), Ok(TimeField::Due));
    }

    #[test]
    fn unknown_selector_lists_expected_values() {
        let err = "colour".parse::<Flag>().unwrap_err();
        assert_eq!(err.what, "flag");
        assert!(err.expected.contains("active"));
        assert!(err.to_string().starts_with("unknown flag 'colour'"));
    }

    #[test]
    fn join_name_skips_blank_parts() {
        assert_eq!(join_name("Ann", "Lee"), "Ann Lee");
        assert_eq!(join_name("Ann", ""), "Ann");
        assert_eq!(join_name("", "Lee"), "Lee");
    }

    #[test]
    fn tag_parse_accepts_key_and_label() {
        assert_eq!(UserKind::parse_tag("teacher"), Ok(UserKind::Teacher));
        assert_eq!(UserKind::parse_tag("Center admin"), Ok(UserKind::CenterAdmin));
        assert_eq!(UserKind::parse_tag("center-admin"), Ok(UserKind::CenterAdmin));
        assert!(UserKind::parse_tag("janitor").is_err());
        assert!(NoTag::parse_tag("anything").is_err());
    }
}
