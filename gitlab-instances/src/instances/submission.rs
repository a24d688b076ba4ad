//! Edited instance settings awaiting validation.
//!
//! A submission mirrors the settings table: one row per registered instance
//! (key fixed, host and URL editable, a delete flag) plus one blank row for
//! adding a new instance.

use crate::instances::GitLabHost;

/// An edited row for an already registered instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRow {
    /// Key of the instance. Not editable; renaming is delete + insert.
    pub key: String,

    /// Edited host name.
    pub host: String,

    /// Edited base URL.
    pub url: String,

    /// Whether the instance should be removed.
    pub delete: bool,
}

impl From<&GitLabHost> for InstanceRow {
    fn from(host: &GitLabHost) -> Self {
        Self {
            key: host.key.clone(),
            host: host.host.clone(),
            url: host.url.clone(),
            delete: false,
        }
    }
}

/// The always-present row for registering a new instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewInstanceRow {
    pub key: String,
    pub host: String,
    pub url: String,
}

impl NewInstanceRow {
    /// Creates a filled-in new row.
    pub fn new(key: impl Into<String>, host: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            host: host.into(),
            url: url.into(),
        }
    }

    /// Returns true if every field is empty. Whitespace counts as input.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.key.is_empty() && self.host.is_empty() && self.url.is_empty()
    }
}

/// A full settings submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSubmission {
    /// Rows for registered instances, in registry order.
    pub rows: Vec<InstanceRow>,

    /// The new-instance row.
    pub new_row: NewInstanceRow,
}

impl SettingsSubmission {
    /// Builds the unedited settings table for `hosts`.
    pub fn from_hosts(hosts: &[GitLabHost]) -> Self {
        Self {
            rows: hosts.iter().map(InstanceRow::from).collect(),
            new_row: NewInstanceRow::default(),
        }
    }

    /// Returns the row for `key`, if present.
    pub fn row_mut(&mut self, key: &str) -> Option<&mut InstanceRow> {
        self.rows.iter_mut().find(|row| row.key == key)
    }

    /// Flags the row for `key` for deletion. Returns false if there is no such row.
    pub fn mark_for_deletion(&mut self, key: &str) -> bool {
        match self.row_mut(key) {
            Some(row) => {
                row.delete = true;
                true
            }
            None => false,
        }
    }

    /// Keys of rows flagged for deletion.
    pub fn deletions(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter(|row| row.delete)
            .map(|row| row.key.as_str())
    }
}
