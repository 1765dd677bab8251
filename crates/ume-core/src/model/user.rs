use super::{Flag, Record, TagInfo, TagKind, TextField, TimeField, join_name};
use crate::password::Credential;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Role a user holds within the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    AppAdmin,
    CenterAdmin,
    Teacher,
    Family,
    Student,
}

static USER_KINDS: [TagInfo; 5] = [
    TagInfo {
        key: "app_admin",
        label: "App admin",
        icon: "admin_panel_settings",
        color: 0x00_67_3A_B7,
    },
    TagInfo {
        key: "center_admin",
        label: "Center admin",
        icon: "business",
        color: 0x00_3F_51_B5,
    },
    TagInfo {
        key: "teacher",
        label: "Teacher",
        icon: "school",
        color: 0x00_00_96_88,
    },
    TagInfo {
        key: "family",
        label: "Family",
        icon: "family_restroom",
        color: 0x00_FF_98_00,
    },
    TagInfo {
        key: "student",
        label: "Student",
        icon: "child_care",
        color: 0x00_4C_AF_50,
    },
];

impl TagKind for UserKind {
    const ALL: &'static [Self] = &[
        Self::AppAdmin,
        Self::CenterAdmin,
        Self::Teacher,
        Self::Family,
        Self::Student,
    ];
    const WHAT: &'static str = "user kind";

    fn info(self) -> &'static TagInfo {
        &USER_KINDS[self as usize]
    }
}

/// One role assignment of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub kind: UserKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_id: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// A person with an account: admin, teacher, family member or student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// National ID; doubles as the document key.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// Set when the account password is reset through this tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

const fn default_active() -> bool {
    true
}

impl User {
    /// Create an active user with no profiles.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            surname: String::new(),
            email: String::new(),
            phone: String::new(),
            registered_at: None,
            active: true,
            profiles: Vec::new(),
            credential: None,
        }
    }

    /// The role used for filtering: the first profile, or student when the
    /// user has none.
    #[must_use]
    pub fn primary_kind(&self) -> UserKind {
        self.profiles
            .first()
            .map_or(UserKind::Student, |profile| profile.kind)
    }
}

impl Record for User {
    type Tag = UserKind;

    const SEARCH_FIELDS: &'static [TextField] = &[
        TextField::Name,
        TextField::Surname,
        TextField::Email,
        TextField::Identifier,
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: TextField) -> Option<Cow<'_, str>> {
        match field {
            TextField::Name => Some(Cow::Borrowed(&self.name)),
            TextField::Surname => Some(Cow::Borrowed(&self.surname)),
            TextField::FullName => Some(join_name(&self.name, &self.surname)),
            TextField::Email => Some(Cow::Borrowed(&self.email)),
            TextField::Identifier => Some(Cow::Borrowed(&self.id)),
            TextField::Phone => Some(Cow::Borrowed(&self.phone)),
            TextField::Title | TextField::Body | TextField::Location => None,
        }
    }

    fn tag(&self) -> Option<UserKind> {
        Some(self.primary_kind())
    }

    fn flag(&self, flag: Flag) -> Option<bool> {
        match flag {
            Flag::Active => Some(self.active),
            Flag::Read | Flag::Confirmed | Flag::Completed => None,
        }
    }

    fn timestamp(&self, field: TimeField) -> Option<DateTime<Utc>> {
        match field {
            TimeField::Created => self.registered_at,
            TimeField::Due => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_kind_defaults_to_student() {
        let mut user = User::new("12345678Z", "Ann");
        assert_eq!(user.primary_kind(), UserKind::Student);

        user.profiles = vec![
            Profile {
                kind: UserKind::Teacher,
                center_id: Some("c-1".into()),
                verified: true,
            },
            Profile {
                kind: UserKind::Family,
                center_id: None,
                verified: false,
            },
        ];
        assert_eq!(user.tag(), Some(UserKind::Teacher));
    }

    #[test]
    fn text_fields_map_to_user_attributes() {
        let mut user = User::new("12345678Z", "Ann");
        user.surname = "Lee".into();
        user.email = "ann@example.com".into();

        assert_eq!(user.text(TextField::FullName).as_deref(), Some("Ann Lee"));
        assert_eq!(user.text(TextField::Identifier).as_deref(), Some("12345678Z"));
        assert_eq!(user.text(TextField::Title), None);
        assert_eq!(user.flag(Flag::Active), Some(true));
        assert_eq!(user.flag(Flag::Read), None);
    }

    #[test]
    fn tag_table_is_indexed_by_variant() {
        for kind in UserKind::ALL {
            let info = kind.info();
            assert_eq!(UserKind::parse_tag(info.key), Ok(*kind));
        }
    }

    #[test]
    fn deserialize_applies_defaults() {
        let user: User = serde_json::from_str(r#"{"id":"X1","name":"Bob"}"#).unwrap();
        assert!(user.active);
        assert!(user.profiles.is_empty());
        assert_eq!(user.registered_at, None);
    }
}
