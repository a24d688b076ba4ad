#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod credentials;
pub mod gitlab;
pub mod instances;
pub mod messages;
pub mod resolver;
pub mod source;
pub mod store;

pub use credentials::{
    Credential, CredentialError, CredentialStore, FileCredentialStore, KeyProvider,
    MemoryCredentialStore, PERSONAL_ACCESS_TOKEN,
};
pub use gitlab::{ClientFactory, GitLabError, Project, ProjectClient, RestClient, RestClientFactory};
pub use instances::{
    FieldError, GitLabHost, InstanceField, InstanceRegistry, InstanceRow, NewInstanceRow,
    RegistryError, RowRef, SettingsSubmission, ValidationErrors,
};
pub use messages::{MessageLog, Messenger, TracingMessenger};
pub use resolver::{GitLabResolver, RepositoryRecord, ResolveError};
pub use source::{find_source, RepositorySource};
pub use store::{ConfigStore, MemoryInstanceStore, StoreError, TomlInstanceStore};
