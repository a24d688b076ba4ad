use std::fs;
use std::path::PathBuf;

use gitlab_instances::{
    ConfigStore, FileCredentialStore, GitLabHost, InstanceField, InstanceRegistry,
    NewInstanceRow, RegistryError, RowRef, TomlInstanceStore,
};
use tempfile::TempDir;

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copies the fixture instances file into a scratch directory.
fn scratch_store(temp: &TempDir) -> TomlInstanceStore {
    let path = temp.path().join("instances.toml");
    fs::copy(fixtures_root().join("instances.toml"), &path).unwrap();
    TomlInstanceStore::new(path)
}

fn credentials() -> FileCredentialStore {
    FileCredentialStore::load(&fixtures_root().join("keys.toml")).unwrap()
}

#[test]
fn load_registry_from_fixture() {
    let registry =
        InstanceRegistry::load(&TomlInstanceStore::new(fixtures_root().join("instances.toml")))
            .unwrap();

    assert_eq!(
        registry.hosts(),
        &[
            GitLabHost::new("work", "gitlab.work.example", "https://gitlab.work.example"),
            GitLabHost::new("cloud", "gitlab.com", "https://gitlab.com"),
        ]
    );
}

#[test]
fn saved_registry_reloads_identically() {
    let temp = TempDir::new().unwrap();
    let store = scratch_store(&temp);

    let mut submission = InstanceRegistry::load(&store).unwrap().submission();
    submission.mark_for_deletion("cloud");
    submission.new_row = NewInstanceRow::new(
        "staging",
        "gitlab.staging.example",
        "https://gitlab.staging.example",
    );

    let saved = InstanceRegistry::save(&store, &credentials(), &submission).unwrap();
    let reloaded = InstanceRegistry::load(&store).unwrap();

    assert_eq!(reloaded, saved);
    assert_eq!(
        reloaded.hosts(),
        &[
            GitLabHost::new("work", "gitlab.work.example", "https://gitlab.work.example"),
            GitLabHost::new(
                "staging",
                "gitlab.staging.example",
                "https://gitlab.staging.example"
            ),
        ]
    );
    assert!(reloaded.get("cloud").is_none());
}

#[test]
fn rejected_submission_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let store = scratch_store(&temp);
    let before = fs::read_to_string(store.path()).unwrap();

    let mut submission = InstanceRegistry::load(&store).unwrap().submission();
    submission.mark_for_deletion("work");
    submission.new_row = NewInstanceRow::new("unknown", "x", "https://ok.example");

    let result = InstanceRegistry::save(&store, &credentials(), &submission);

    let Err(RegistryError::Validation(errors)) = result else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors.get(&RowRef::New, InstanceField::Key).is_some());
    assert!(errors.get(&RowRef::New, InstanceField::Host).is_some());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn env_backed_key_counts_as_existing() {
    let temp = TempDir::new().unwrap();
    let store = TomlInstanceStore::new(temp.path().join("instances.toml"));

    let mut submission = InstanceRegistry::default().submission();
    submission.new_row = NewInstanceRow::new("cloud", "gitlab.com", "https://gitlab.com");

    temp_env::with_var_unset("GITLAB_INSTANCES_FIXTURE_TOKEN", || {
        InstanceRegistry::save(&store, &credentials(), &submission).unwrap();
    });

    assert_eq!(store.load_instances().unwrap().len(), 1);
}
