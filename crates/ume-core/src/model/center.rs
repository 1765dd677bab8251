use super::{Flag, NoTag, Record, TextField, TimeField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Postal address of a center.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

impl Address {
    /// "City, Province" with blank parts dropped.
    #[must_use]
    pub fn locality(&self) -> String {
        [self.city.as_str(), self.province.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A school or daycare center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Center {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl Record for Center {
    type Tag = NoTag;

    const SEARCH_FIELDS: &'static [TextField] = &[TextField::Name, TextField::Location];

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: TextField) -> Option<Cow<'_, str>> {
        match field {
            TextField::Name | TextField::FullName | TextField::Title => {
                Some(Cow::Borrowed(&self.name))
            }
            TextField::Location => Some(Cow::Owned(self.address.locality())),
            TextField::Email => Some(Cow::Borrowed(&self.email)),
            TextField::Phone => Some(Cow::Borrowed(&self.phone)),
            TextField::Identifier => Some(Cow::Borrowed(&self.id)),
            TextField::Surname | TextField::Body => None,
        }
    }

    fn flag(&self, flag: Flag) -> Option<bool> {
        matches!(flag, Flag::Active).then_some(self.active)
    }

    fn timestamp(&self, field: TimeField) -> Option<DateTime<Utc>> {
        match field {
            TimeField::Created => self.created_at,
            TimeField::Due => None,
        }
    }
}
