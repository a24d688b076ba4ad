//! CLI for managing GitLab instances.
//!
//! Registers instances in an instances file, validates edits the same way
//! the library does, and resolves repository URLs against the registered
//! instances.

use clap::{Parser, Subcommand};
use gitlab_instances::{
    CredentialError, FileCredentialStore, GitLabResolver, InstanceRegistry, MessageLog, Messenger,
    NewInstanceRow, RegistryError, ResolveError, RestClientFactory, SettingsSubmission,
    TomlInstanceStore,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Manage GitLab instances and resolve repository URLs against them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the instances file.
    #[arg(
        long,
        env = "GITLAB_INSTANCES_PATH",
        default_value = "instances.toml",
        global = true
    )]
    instances: PathBuf,

    /// Path to the key file holding access tokens.
    #[arg(long, env = "GITLAB_KEYS_PATH", default_value = "keys.toml", global = true)]
    keys: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered instances.
    List,

    /// Register a new instance.
    Add {
        /// Instance key; must exist in the key file.
        #[arg(long)]
        key: String,
        /// Domain name (e.g., gitlab.example.com).
        #[arg(long)]
        host: String,
        /// Base URL (e.g., https://gitlab.example.com).
        #[arg(long)]
        url: String,
    },

    /// Change the host or URL of a registered instance.
    Update {
        /// Key of the instance to edit.
        key: String,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },

    /// Remove registered instances.
    Remove {
        /// Keys of the instances to remove.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Check whether a URL points at a repository on a registered instance.
    Matches { uri: String },

    /// Show the accepted repository URL shapes.
    HelpText,

    /// Fetch repository metadata and print it as JSON.
    Fetch { uri: String },
}

/// Errors that stop a command.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("No instance registered under key '{0}'")]
    UnknownKey(String),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a command that ran to completion.
enum Outcome {
    /// The command did what was asked.
    Done,
    /// Nothing matched (no such repository, or the fetch failed upstream).
    NoMatch,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    match run(args).await {
        Ok(Outcome::Done) => ExitCode::from(0),
        Ok(Outcome::NoMatch) => ExitCode::from(1),
        Err(CliError::Registry(RegistryError::Validation(errors))) => {
            eprintln!("Instance settings were not saved:");
            for field_error in errors.errors() {
                eprintln!("  {field_error}");
            }
            ExitCode::from(1)
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output) on stderr, so command
///   output on stdout stays machine-readable
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        // Compact formatting without module target paths, written to stderr
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        // Allow runtime log filtering via RUST_LOG env var (e.g., RUST_LOG=debug)
        // Falls back to "info" level if RUST_LOG is not set or invalid
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        // Register as the global default subscriber
        .init();
}

async fn run(args: Args) -> Result<Outcome, CliError> {
    let store = TomlInstanceStore::new(&args.instances);

    match args.command {
        Command::List => {
            let registry = InstanceRegistry::load(&store)?;
            print_table(&registry.submission());
            Ok(Outcome::Done)
        }
        Command::Add { key, host, url } => {
            let mut submission = InstanceRegistry::load(&store)?.submission();
            submission.new_row = NewInstanceRow::new(key, host, url);
            let credentials = credentials_for(&submission, &args.keys)?;
            InstanceRegistry::save(&store, &credentials, &submission)?;
            Ok(Outcome::Done)
        }
        Command::Update { key, host, url } => {
            let mut submission = InstanceRegistry::load(&store)?.submission();
            let row = submission
                .row_mut(&key)
                .ok_or_else(|| CliError::UnknownKey(key.clone()))?;
            if let Some(host) = host {
                row.host = host;
            }
            if let Some(url) = url {
                row.url = url;
            }
            let credentials = credentials_for(&submission, &args.keys)?;
            InstanceRegistry::save(&store, &credentials, &submission)?;
            Ok(Outcome::Done)
        }
        Command::Remove { keys } => {
            let mut submission = InstanceRegistry::load(&store)?.submission();
            for key in keys {
                if !submission.mark_for_deletion(&key) {
                    return Err(CliError::UnknownKey(key));
                }
            }
            let credentials = credentials_for(&submission, &args.keys)?;
            InstanceRegistry::save(&store, &credentials, &submission)?;
            Ok(Outcome::Done)
        }
        Command::Matches { uri } => {
            let (resolver, _) = build_resolver(&args.keys, &store)?;
            if resolver.matches(&uri) {
                println!("yes");
                Ok(Outcome::Done)
            } else {
                println!("no");
                Ok(Outcome::NoMatch)
            }
        }
        Command::HelpText => {
            let (resolver, _) = build_resolver(&args.keys, &store)?;
            println!("{}", resolver.help_text());
            Ok(Outcome::Done)
        }
        Command::Fetch { uri } => {
            let (resolver, messages) = build_resolver(&args.keys, &store)?;
            let record = resolver.fetch(&uri).await?;
            for message in messages.drain() {
                eprintln!("{message}");
            }
            match record {
                Some(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    Ok(Outcome::Done)
                }
                None => Ok(Outcome::NoMatch),
            }
        }
    }
}

/// Loads the key file only when the new-instance row is filled in, since
/// no other row is checked against the key store.
fn credentials_for(
    submission: &SettingsSubmission,
    keys: &Path,
) -> Result<FileCredentialStore, CliError> {
    if submission.new_row.is_blank() {
        Ok(FileCredentialStore::default())
    } else {
        Ok(FileCredentialStore::load(keys)?)
    }
}

fn build_resolver(
    keys: &Path,
    store: &TomlInstanceStore,
) -> Result<(GitLabResolver, Arc<MessageLog>), CliError> {
    let registry = InstanceRegistry::load(store)?;
    let credentials = FileCredentialStore::load(keys)?;
    let messages = Arc::new(MessageLog::new());
    let resolver = GitLabResolver::new(
        &registry,
        Arc::new(credentials),
        Arc::new(RestClientFactory::new()),
        Arc::clone(&messages) as Arc<dyn Messenger>,
    )?;
    Ok((resolver, messages))
}

/// Prints the settings table.
fn print_table(submission: &SettingsSubmission) {
    if submission.rows.is_empty() {
        println!("No instances registered.");
        return;
    }

    let key_width = column_width("KEY", submission.rows.iter().map(|row| row.key.as_str()));
    let host_width = column_width("HOST", submission.rows.iter().map(|row| row.host.as_str()));

    println!("{:key_width$}  {:host_width$}  URL", "KEY", "HOST");
    for row in &submission.rows {
        println!("{:key_width$}  {:host_width$}  {}", row.key, row.host, row.url);
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(str::len).chain([header.len()]).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitlab_instances::GitLabHost;
    use std::io::Write;

    fn broken_key_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[keys.work\nprovider = ").unwrap();
        file
    }

    #[test]
    fn edits_without_new_row_skip_key_file() {
        let keys = broken_key_file();
        let hosts = [GitLabHost::new("work", "gitlab.com", "https://gitlab.com")];
        let mut submission = SettingsSubmission::from_hosts(&hosts);
        assert!(submission.mark_for_deletion("work"));

        assert!(credentials_for(&submission, keys.path()).is_ok());
    }

    #[test]
    fn new_row_reads_key_file() {
        let keys = broken_key_file();
        let submission = SettingsSubmission {
            rows: Vec::new(),
            new_row: NewInstanceRow::new("work", "gitlab.com", "https://gitlab.com"),
        };

        let result = credentials_for(&submission, keys.path());
        assert!(matches!(result, Err(CliError::Credentials(_))));
    }
}
