//! Registered GitLab instances.
//!
//! The registry is an ordered, immutable snapshot of [`GitLabHost`] records
//! read from a [`ConfigStore`]. Edits go through [`InstanceRegistry::save`],
//! which validates a whole [`SettingsSubmission`] before anything is written.

mod error;
mod host;
mod submission;
mod validation;

pub use error::RegistryError;
pub use host::GitLabHost;
pub use submission::{InstanceRow, NewInstanceRow, SettingsSubmission};
pub use validation::{
    is_valid_host, is_valid_key, is_valid_url, validate_submission, FieldError, InstanceField,
    RowRef, ValidationErrors,
};

use crate::credentials::CredentialStore;
use crate::store::ConfigStore;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// An ordered snapshot of registered instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceRegistry {
    hosts: Vec<GitLabHost>,
}

impl InstanceRegistry {
    /// Creates a registry from already validated hosts.
    pub fn new(hosts: Vec<GitLabHost>) -> Self {
        Self { hosts }
    }

    /// Loads every stored instance, preserving stored order.
    ///
    /// Entries are trusted to have been validated when saved.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the store can't be read.
    pub fn load(store: &dyn ConfigStore) -> Result<Self, RegistryError> {
        let hosts = store.load_instances()?;
        debug!(count = hosts.len(), "Loaded instance registry");
        Ok(Self { hosts })
    }

    /// Validates and applies `submission` to the stored instances.
    ///
    /// Deletions are applied first, then edited rows and the new row are
    /// upserted by key. The stored list is re-read so the submission is
    /// applied to the latest state.
    ///
    /// # Returns
    ///
    /// The registry as saved.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] with every failing field, in
    /// which case nothing is written, or [`RegistryError::Store`] if the
    /// store fails.
    pub fn save(
        store: &dyn ConfigStore,
        credentials: &dyn CredentialStore,
        submission: &SettingsSubmission,
    ) -> Result<Self, RegistryError> {
        let current = store.load_instances()?;
        validate_submission(submission, &current, credentials)?;

        let hosts = apply_submission(current, submission);
        warn_duplicate_hosts(&hosts);

        store.save_instances(&hosts)?;
        info!(count = hosts.len(), "Saved instance registry");
        Ok(Self { hosts })
    }

    /// Returns the hosts in registry order.
    pub fn hosts(&self) -> &[GitLabHost] {
        &self.hosts
    }

    /// Returns the host registered under `key`.
    pub fn get(&self, key: &str) -> Option<&GitLabHost> {
        self.hosts.iter().find(|host| host.key == key)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Builds the unedited settings table for this registry.
    pub fn submission(&self) -> SettingsSubmission {
        SettingsSubmission::from_hosts(&self.hosts)
    }
}

fn apply_submission(
    mut hosts: Vec<GitLabHost>,
    submission: &SettingsSubmission,
) -> Vec<GitLabHost> {
    let deletions: HashSet<&str> = submission.deletions().collect();
    hosts.retain(|host| !deletions.contains(host.key.as_str()));

    // Edited rows only replace stored instances; they never add one.
    for row in submission.rows.iter().filter(|row| !row.delete) {
        if let Some(existing) = hosts.iter_mut().find(|host| host.key == row.key) {
            existing.host.clone_from(&row.host);
            existing.url.clone_from(&row.url);
        }
    }

    let new_row = &submission.new_row;
    if !new_row.is_blank() {
        upsert(
            &mut hosts,
            GitLabHost::new(new_row.key.clone(), new_row.host.clone(), new_row.url.clone()),
        );
    }

    hosts
}

fn upsert(hosts: &mut Vec<GitLabHost>, host: GitLabHost) {
    match hosts.iter_mut().find(|existing| existing.key == host.key) {
        Some(existing) => *existing = host,
        None => hosts.push(host),
    }
}

/// Only the first instance with a given host is ever used when resolving.
fn warn_duplicate_hosts(hosts: &[GitLabHost]) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for host in hosts {
        if let Some(first) = seen.get(&host.host.to_ascii_lowercase()) {
            warn!(
                host = %host.host,
                key = %host.key,
                shadowed_by = %first,
                "Instance shares its host with an earlier instance and will never be used"
            );
        } else {
            seen.insert(host.host.to_ascii_lowercase(), &host.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::store::MemoryInstanceStore;

    fn store() -> MemoryInstanceStore {
        MemoryInstanceStore::new(vec![
            GitLabHost::new("k1", "one.com", "https://one.com"),
            GitLabHost::new("k2", "two.com", "https://two.com"),
        ])
    }

    fn credentials() -> MemoryCredentialStore {
        MemoryCredentialStore::new()
            .with_token("k1", "t1")
            .with_token("k2", "t2")
            .with_token("k3", "t3")
    }

    #[test]
    fn load_preserves_order() {
        let registry = InstanceRegistry::load(&store()).unwrap();
        let keys: Vec<_> = registry.hosts().iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2"]);
        assert_eq!(registry.get("k2").unwrap().host, "two.com");
    }

    #[test]
    fn save_applies_deletions_edits_and_new_row() {
        let store = store();
        let registry = InstanceRegistry::load(&store).unwrap();

        let mut submission = registry.submission();
        submission.mark_for_deletion("k1");
        submission.row_mut("k2").unwrap().url = "https://git.two.com".to_string();
        submission.new_row = NewInstanceRow::new("k3", "three.com", "https://three.com");

        let saved = InstanceRegistry::save(&store, &credentials(), &submission).unwrap();

        assert_eq!(
            saved.hosts(),
            &[
                GitLabHost::new("k2", "two.com", "https://git.two.com"),
                GitLabHost::new("k3", "three.com", "https://three.com"),
            ]
        );
        assert_eq!(InstanceRegistry::load(&store).unwrap(), saved);
    }

    #[test]
    fn invalid_submission_writes_nothing() {
        let store = store();
        let mut submission = InstanceRegistry::load(&store).unwrap().submission();
        submission.mark_for_deletion("k2");
        submission.row_mut("k1").unwrap().host = "bad host".to_string();

        let result = InstanceRegistry::save(&store, &credentials(), &submission);

        assert!(matches!(result, Err(RegistryError::Validation(ref e)) if e.len() == 1));
        assert_eq!(store.load_instances().unwrap().len(), 2);
    }

    #[test]
    fn key_can_be_reused_after_deletion() {
        let store = store();
        let mut submission = InstanceRegistry::load(&store).unwrap().submission();
        submission.mark_for_deletion("k1");
        submission.new_row = NewInstanceRow::new("k1", "moved.com", "https://moved.com");

        let saved = InstanceRegistry::save(&store, &credentials(), &submission).unwrap();

        assert_eq!(saved.hosts()[1], GitLabHost::new("k1", "moved.com", "https://moved.com"));
    }

    #[test]
    fn duplicate_hosts_are_accepted() {
        let store = store();
        let mut submission = InstanceRegistry::load(&store).unwrap().submission();
        submission.new_row = NewInstanceRow::new("k3", "one.com", "https://one.com");

        let saved = InstanceRegistry::save(&store, &credentials(), &submission).unwrap();
        assert_eq!(saved.len(), 3);
    }

    #[test]
    fn rows_for_unknown_keys_are_not_stored() {
        let store = store();
        let mut submission = InstanceRegistry::load(&store).unwrap().submission();
        submission.rows.push(InstanceRow {
            key: "Bad Key!".to_string(),
            host: "evil.com".to_string(),
            url: "https://evil.com".to_string(),
            delete: false,
        });

        let result = InstanceRegistry::save(&store, &credentials(), &submission);

        assert!(matches!(result, Err(RegistryError::Validation(ref e)) if e.len() == 1));
        assert!(store.load_instances().unwrap().iter().all(|h| h.key != "Bad Key!"));
    }

    #[test]
    fn stale_table_does_not_restore_deleted_instance() {
        let store = store();
        let stale = InstanceRegistry::load(&store).unwrap().submission();

        let mut removal = stale.clone();
        removal.mark_for_deletion("k2");
        InstanceRegistry::save(&store, &credentials(), &removal).unwrap();

        let result = InstanceRegistry::save(&store, &credentials(), &stale);

        assert!(matches!(result, Err(RegistryError::Validation(ref e)) if e.len() == 1));
        let keys: Vec<_> = store.load_instances().unwrap().into_iter().map(|h| h.key).collect();
        assert_eq!(keys, vec!["k1"]);
    }

    #[test]
    fn apply_ignores_rows_without_stored_instance() {
        let hosts = vec![GitLabHost::new("k1", "one.com", "https://one.com")];
        let mut submission = SettingsSubmission::from_hosts(&hosts);
        submission.rows.push(InstanceRow::from(&GitLabHost::new(
            "k2",
            "two.com",
            "https://two.com",
        )));

        assert_eq!(apply_submission(hosts.clone(), &submission), hosts);
    }
}
