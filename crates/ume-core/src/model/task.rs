use super::{Flag, Record, TagInfo, TagKind, TextField, TimeField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Progress of a homework task.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

static TASK_STATUSES: [TagInfo; 3] = [
    TagInfo {
        key: "pending",
        label: "Pending",
        icon: "pending_actions",
        color: 0x00_FF_98_00,
    },
    TagInfo {
        key: "in_progress",
        label: "In progress",
        icon: "autorenew",
        color: 0x00_21_96_F3,
    },
    TagInfo {
        key: "completed",
        label: "Completed",
        icon: "task_alt",
        color: 0x00_4C_AF_50,
    },
];

impl TagKind for TaskStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::InProgress, Self::Completed];
    const WHAT: &'static str = "task status";

    fn info(self) -> &'static TagInfo {
        &TASK_STATUSES[self as usize]
    }
}

/// Homework or activity assigned to a student or class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A task is overdue once its due date has passed without completion.
    #[must_use]
    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Completed && self.due_at.is_some_and(|due| due < as_of)
    }
}

impl Record for Task {
    type Tag = TaskStatus;

    const SEARCH_FIELDS: &'static [TextField] =
        &[TextField::Title, TextField::Body, TextField::Identifier];

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: TextField) -> Option<Cow<'_, str>> {
        match field {
            TextField::Title | TextField::Name | TextField::FullName => {
                Some(Cow::Borrowed(&self.title))
            }
            TextField::Body => Some(Cow::Borrowed(&self.description)),
            TextField::Identifier => Some(Cow::Borrowed(&self.id)),
            TextField::Surname | TextField::Email | TextField::Phone | TextField::Location => None,
        }
    }

    fn tag(&self) -> Option<TaskStatus> {
        Some(self.status)
    }

    fn flag(&self, flag: Flag) -> Option<bool> {
        matches!(flag, Flag::Completed).then_some(self.status == TaskStatus::Completed)
    }

    fn timestamp(&self, field: TimeField) -> Option<DateTime<Utc>> {
        match field {
            TimeField::Created => self.created_at,
            TimeField::Due => self.due_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(status: TaskStatus, due_day: Option<u32>) -> Task {
        Task {
            id: "t-1".into(),
            title: "Draw a tree".into(),
            description: String::new(),
            subject: "Art".into(),
            student_id: None,
            status,
            created_at: None,
            due_at: due_day.map(|d| Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn overdue_requires_past_due_and_not_completed() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        assert!(task(TaskStatus::Pending, Some(5)).is_overdue(now));
        assert!(task(TaskStatus::InProgress, Some(9)).is_overdue(now));
        assert!(!task(TaskStatus::Completed, Some(5)).is_overdue(now));
        assert!(!task(TaskStatus::Pending, Some(15)).is_overdue(now));
        assert!(!task(TaskStatus::Pending, None).is_overdue(now));
    }

    #[test]
    fn completed_flag_follows_status() {
        assert_eq!(task(TaskStatus::Completed, None).flag(Flag::Completed), Some(true));
        assert_eq!(task(TaskStatus::Pending, None).flag(Flag::Completed), Some(false));
        assert_eq!(task(TaskStatus::Pending, None).flag(Flag::Active), None);
    }
}
