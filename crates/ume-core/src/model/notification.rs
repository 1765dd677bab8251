use super::{Flag, Record, TagInfo, TagKind, TextField, TimeField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Category of an in-app notification.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    Task,
    Event,
    Grade,
    Attendance,
    #[default]
    General,
}

static NOTIFICATION_KINDS: [TagInfo; 6] = [
    TagInfo {
        key: "message",
        label: "Message",
        icon: "mail",
        color: 0x00_21_96_F3,
    },
    TagInfo {
        key: "task",
        label: "Task",
        icon: "assignment",
        color: 0x00_4C_AF_50,
    },
    TagInfo {
        key: "event",
        label: "Event",
        icon: "event",
        color: 0x00_FF_98_00,
    },
    TagInfo {
        key: "grade",
        label: "Grade",
        icon: "grade",
        color: 0x00_FF_EB_3B,
    },
    TagInfo {
        key: "attendance",
        label: "Attendance",
        icon: "how_to_reg",
        color: 0x00_9C_27_B0,
    },
    TagInfo {
        key: "general",
        label: "General",
        icon: "notifications",
        color: 0x00_60_7D_8B,
    },
];

impl TagKind for NotificationKind {
    const ALL: &'static [Self] = &[
        Self::Message,
        Self::Task,
        Self::Event,
        Self::Grade,
        Self::Attendance,
        Self::General,
    ];
    const WHAT: &'static str = "notification kind";

    fn info(self) -> &'static TagInfo {
        &NOTIFICATION_KINDS[self as usize]
    }
}

/// An in-app notification delivered to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Notification {
    type Tag = NotificationKind;

    const SEARCH_FIELDS: &'static [TextField] = &[TextField::Title, TextField::Body];

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: TextField) -> Option<Cow<'_, str>> {
        match field {
            TextField::Title | TextField::Name => Some(Cow::Borrowed(&self.title)),
            TextField::Body => Some(Cow::Borrowed(&self.body)),
            TextField::Identifier => Some(Cow::Borrowed(&self.id)),
            _ => None,
        }
    }

    fn tag(&self) -> Option<NotificationKind> {
        Some(self.kind)
    }

    fn flag(&self, flag: Flag) -> Option<bool> {
        matches!(flag, Flag::Read).then_some(self.read)
    }

    fn timestamp(&self, field: TimeField) -> Option<DateTime<Utc>> {
        matches!(field, TimeField::Created)
            .then_some(self.created_at)
            .flatten()
    }
}
