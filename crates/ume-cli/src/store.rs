//! JSON snapshot file used as the batch backend for `ume batch`.

use anyhow::Context as _;
use chrono::Utc;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use ume_core::{Credential, RecordActions};
use ume_core::error::ActionError;
use ume_core::model::User;

/// Users loaded from a JSON array, mutated in memory and written back with
/// [`UserStore::save`].
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    users: Vec<User>,
    password_resets: BTreeSet<String>,
    dirty: bool,
}

impl UserStore {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let users: Vec<User> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            users,
            password_resets: BTreeSet::new(),
            dirty: false,
        })
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Accounts whose password was replaced during this session.
    pub const fn password_resets(&self) -> &BTreeSet<String> {
        &self.password_resets
    }

    /// Write the snapshot back if anything changed. Returns whether the file
    /// was written.
    pub fn save(&mut self) -> anyhow::Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let mut json = serde_json::to_string_pretty(&self.users)?;
        json.push('\n');
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), users = self.users.len(), "snapshot saved");
        Ok(true)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut User, ActionError> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ActionError::NotFound(id.to_string()))
    }
}

impl RecordActions for UserStore {
    fn delete(&mut self, id: &str) -> Result<(), ActionError> {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        if self.users.len() == before {
            return Err(ActionError::NotFound(id.to_string()));
        }
        self.dirty = true;
        Ok(())
    }

    fn set_active(&mut self, id: &str, active: bool) -> Result<(), ActionError> {
        let user = self.find_mut(id)?;
        if user.active != active {
            user.active = active;
            self.dirty = true;
        }
        Ok(())
    }

    fn reset_password(&mut self, id: &str, password: &str) -> Result<(), ActionError> {
        let user = self.find_mut(id)?;
        if user.email.trim().is_empty() {
            return Err(ActionError::Rejected {
                id: id.to_string(),
                reason: "no account email".into(),
            });
        }
        user.credential = Some(Credential::new(password, Utc::now()));
        self.password_resets.insert(id.to_string());
        self.dirty = true;
        Ok(())
    }
}
