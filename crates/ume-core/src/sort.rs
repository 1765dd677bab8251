//! Sort policy.
//!
//! Orders a filtered view by an ordered list of keys. The sort is stable:
//! records that tie on every key keep their input order, so unrelated state
//! changes never reshuffle a list on screen.

use crate::model::{Flag, Record, TextField, TimeField};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// What a sort key compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Case-insensitive text comparison.
    Text(TextField),
    /// `false` before `true`.
    Flag(Flag),
    Time(TimeField),
    /// Tag declaration order.
    Tag,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(field) => write!(f, "{field}"),
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Time(field) => write!(f, "{field}"),
            Self::Tag => f.write_str("tag"),
        }
    }
}

impl FromStr for SortField {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("tag") {
            return Ok(Self::Tag);
        }
        if let Ok(field) = s.parse::<TextField>() {
            return Ok(Self::Text(field));
        }
        if let Ok(flag) = s.parse::<Flag>() {
            return Ok(Self::Flag(flag));
        }
        if let Ok(field) = s.parse::<TimeField>() {
            return Ok(Self::Time(field));
        }
        Err(SortParseError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// One `(field, direction)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    #[serde(default)]
    pub direction: Direction,
}

impl SortKey {
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
        }
    }

    #[must_use]
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortParseError {
    #[error("unknown sort field '{0}'")]
    UnknownField(String),
    #[error("unknown sort direction '{0}': expected asc or desc")]
    UnknownDirection(String),
}

/// Ordered list of sort keys; ties fall through to the next key and finally
/// to input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortPolicy {
    keys: Vec<SortKey>,
}

impl SortPolicy {
    #[must_use]
    pub const fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Active records first, then alphabetical by name.
    #[must_use]
    pub fn active_first_by_name() -> Self {
        Self::new(vec![
            SortKey::desc(SortField::Flag(Flag::Active)),
            SortKey::asc(SortField::Text(TextField::Name)),
        ])
    }

    /// Most recent timestamp first.
    #[must_use]
    pub fn newest_first(field: TimeField) -> Self {
        Self::new(vec![SortKey::desc(SortField::Time(field))])
    }

    /// Earliest due date first, then by title.
    #[must_use]
    pub fn by_due_date() -> Self {
        Self::new(vec![
            SortKey::asc(SortField::Time(TimeField::Due)),
            SortKey::asc(SortField::Text(TextField::Title)),
        ])
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compare two records key by key.
    ///
    /// Records missing a key's value sort after records that have it,
    /// whatever the direction.
    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        self.keys
            .iter()
            .map(|key| compare_key(*key, a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable in-place sort.
    pub fn sort_in_place<R: Record>(&self, items: &mut [&R]) {
        if self.keys.is_empty() {
            return;
        }
        items.sort_by(|a, b| self.compare(*a, *b));
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            let dir = match key.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            write!(f, "{}:{dir}", key.field)?;
        }
        Ok(())
    }
}

impl FromStr for SortPolicy {
    type Err = SortParseError;

    /// Parse `field[:asc|desc],...`, e.g. `active:desc,name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut keys = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (field, dir) = part.split_once(':').unwrap_or((part, "asc"));
            let direction = match dir.trim().to_ascii_lowercase().as_str() {
                "asc" | "ascending" => Direction::Ascending,
                "desc" | "descending" => Direction::Descending,
                _ => return Err(SortParseError::UnknownDirection(dir.to_string())),
            };
            keys.push(SortKey {
                field: field.parse()?,
                direction,
            });
        }
        Ok(Self { keys })
    }
}

/// Sort a filtered view by `policy`, returning the reordered view.
pub fn sort<'a, R: Record>(mut items: Vec<&'a R>, policy: &SortPolicy) -> Vec<&'a R> {
    policy.sort_in_place(&mut items);
    items
}

fn compare_key<R: Record + ?Sized>(key: SortKey, a: &R, b: &R) -> Ordering {
    let dir = key.direction;
    match key.field {
        SortField::Text(field) => compare_present(
            a.text(field).map(|v| v.to_lowercase()),
            b.text(field).map(|v| v.to_lowercase()),
            dir,
        ),
        SortField::Flag(flag) => compare_present(a.flag(flag), b.flag(flag), dir),
        SortField::Time(field) => compare_present(a.timestamp(field), b.timestamp(field), dir),
        SortField::Tag => compare_present(a.tag(), b.tag(), dir),
    }
}

fn compare_present<V: Ord>(a: Option<V>, b: Option<V>, dir: Direction) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => dir.apply(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
