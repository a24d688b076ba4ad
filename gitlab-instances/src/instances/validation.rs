//! Field-by-field validation of settings submissions.
//!
//! Every row is checked and every failing field is reported. A field keeps
//! only its first error.

use crate::credentials::CredentialStore;
use crate::instances::{GitLabHost, SettingsSubmission};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("key pattern is valid"));

static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9-]+\.)+[a-zA-Z0-9-]+$").expect("host pattern is valid")
});

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([a-zA-Z0-9-]+\.)+[a-zA-Z0-9-]+$").expect("URL pattern is valid")
});

/// Returns true if `key` is a well-formed instance key.
pub fn is_valid_key(key: &str) -> bool {
    KEY_PATTERN.is_match(key)
}

/// Returns true if `host` is a bare domain name.
pub fn is_valid_host(host: &str) -> bool {
    HOST_PATTERN.is_match(host)
}

/// Returns true if `url` is an absolute HTTP(S) URL with no path.
pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.is_match(url)
}

/// Identifies a row of the settings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRef {
    /// A registered instance, by key.
    Existing(String),
    /// The new-instance row.
    New,
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing(key) => f.write_str(key),
            Self::New => f.write_str("key-new"),
        }
    }
}

/// A column of the settings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceField {
    Key,
    Host,
    Url,
}

impl InstanceField {
    /// Returns the field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Host => "host",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for InstanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation error attached to one field of one row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("instances.{row}.{field}: {message}")]
pub struct FieldError {
    pub row: RowRef,
    pub field: InstanceField,
    pub message: String,
}

/// Every field error found in a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("instance settings have {} invalid field(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Records an error unless the field already has one.
    fn set(&mut self, row: &RowRef, field: InstanceField, message: &str) {
        if self.get(row, field).is_none() {
            self.errors.push(FieldError {
                row: row.clone(),
                field,
                message: message.to_string(),
            });
        }
    }

    /// Returns the error recorded for a field, if any.
    pub fn get(&self, row: &RowRef, field: InstanceField) -> Option<&FieldError> {
        self.errors
            .iter()
            .find(|error| &error.row == row && error.field == field)
    }

    /// Returns every recorded error in the order found.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Validates `submission` against the currently stored instances.
///
/// # Errors
///
/// Returns [`ValidationErrors`] holding every failing field.
pub fn validate_submission(
    submission: &SettingsSubmission,
    current: &[GitLabHost],
    credentials: &dyn CredentialStore,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for row in submission.rows.iter().filter(|row| !row.delete) {
        let row_ref = RowRef::Existing(row.key.clone());
        // Existing rows only edit stored instances; new keys go through the new row.
        if !current.iter().any(|host| host.key == row.key) {
            errors.set(&row_ref, InstanceField::Key, "The instance no longer exists.");
        }
        check_location(&mut errors, &row_ref, &row.host, &row.url);
    }

    let new_row = &submission.new_row;
    if !new_row.is_blank() {
        let row = RowRef::New;

        if new_row.key.trim().is_empty() {
            errors.set(&row, InstanceField::Key, "The key must be set.");
        }
        if new_row.host.trim().is_empty() {
            errors.set(&row, InstanceField::Host, "The host must be set.");
        }
        if new_row.url.trim().is_empty() {
            errors.set(&row, InstanceField::Url, "The URL must be set.");
        }
        if !is_valid_key(&new_row.key) {
            errors.set(
                &row,
                InstanceField::Key,
                "The key can only contain lower case letters, numbers, hyphens and underscores.",
            );
        }
        if !new_row.key.is_empty() && !credentials.contains(&new_row.key) {
            errors.set(
                &row,
                InstanceField::Key,
                "The key must have an entry in the key store.",
            );
        }
        let deleted = submission.deletions().any(|key| key == new_row.key);
        if !deleted && current.iter().any(|host| host.key == new_row.key) {
            errors.set(
                &row,
                InstanceField::Key,
                "The key is already used by another instance.",
            );
        }

        check_location(&mut errors, &row, &new_row.host, &new_row.url);
    }

    errors.into_result()
}

fn check_location(errors: &mut ValidationErrors, row: &RowRef, host: &str, url: &str) {
    if !is_valid_host(host) {
        errors.set(
            row,
            InstanceField::Host,
            "The host must be a domain name (e.g. git.com).",
        );
    }
    if !is_valid_url(url) {
        errors.set(
            row,
            InstanceField::Url,
            "The URL must be a valid URL (e.g. https://git.com).",
        );
    }
}
