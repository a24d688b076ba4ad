use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gitlab_instances::{
    ClientFactory, FileCredentialStore, GitLabError, GitLabResolver, InstanceRegistry, MessageLog,
    Project, ProjectClient, RepositoryRecord, ResolveError, TomlInstanceStore,
};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Answers every request with a project named after the requested path.
#[derive(Default)]
struct EchoFactory {
    tokens: Mutex<Vec<String>>,
}

struct EchoClient {
    base_url: String,
}

#[async_trait]
impl ProjectClient for EchoClient {
    async fn get_project(&self, path: &str) -> Result<Project, GitLabError> {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Ok(Project {
            path_with_namespace: path.to_string(),
            name,
            description: None,
            open_issues_count: None,
            web_url: format!("{}/{}", self.base_url, path),
        })
    }
}

impl ClientFactory for EchoFactory {
    fn connect(&self, base_url: &str, token: &str) -> Result<Box<dyn ProjectClient>, GitLabError> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(Box::new(EchoClient {
            base_url: base_url.to_string(),
        }))
    }
}

fn resolver(factory: Arc<EchoFactory>, messages: Arc<MessageLog>) -> GitLabResolver {
    let registry =
        InstanceRegistry::load(&TomlInstanceStore::new(fixtures_root().join("instances.toml")))
            .unwrap();
    let credentials = FileCredentialStore::load(&fixtures_root().join("keys.toml")).unwrap();
    GitLabResolver::new(&registry, Arc::new(credentials), factory, messages).unwrap()
}

#[tokio::test]
async fn fetch_uses_inline_token() {
    let factory = Arc::new(EchoFactory::default());
    let messages = Arc::new(MessageLog::new());
    let resolver = resolver(Arc::clone(&factory), Arc::clone(&messages));

    let record = resolver
        .fetch("https://gitlab.work.example/platform/api")
        .await
        .unwrap();

    assert_eq!(
        record,
        Some(RepositoryRecord {
            full_name: "platform/api".to_string(),
            name: "api".to_string(),
            description: None,
            open_issue_count: 0,
            url: "https://gitlab.work.example/platform/api".to_string(),
        })
    );
    assert_eq!(factory.tokens.lock().unwrap().as_slice(), &["glpat-work".to_string()]);
    assert!(messages.messages().is_empty());
}

#[test]
fn env_key_without_variable_fails_loudly() {
    let factory = Arc::new(EchoFactory::default());
    let resolver = resolver(Arc::clone(&factory), Arc::new(MessageLog::new()));

    temp_env::with_var_unset("GITLAB_INSTANCES_FIXTURE_TOKEN", || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(resolver.fetch("https://gitlab.com/acme/widgets"));

        assert!(matches!(result, Err(ResolveError::MissingToken { ref key }) if key == "cloud"));
    });
    assert!(factory.tokens.lock().unwrap().is_empty());
}

#[test]
fn env_key_reads_token_at_fetch_time() {
    let factory = Arc::new(EchoFactory::default());
    let resolver = resolver(Arc::clone(&factory), Arc::new(MessageLog::new()));

    temp_env::with_var("GITLAB_INSTANCES_FIXTURE_TOKEN", Some("glpat-cloud"), || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let record = runtime
            .block_on(resolver.fetch("https://gitlab.com/acme/widgets"))
            .unwrap();

        assert_eq!(record.map(|r| r.full_name), Some("acme/widgets".to_string()));
    });
    assert_eq!(factory.tokens.lock().unwrap().as_slice(), &["glpat-cloud".to_string()]);
}

#[test]
fn help_text_follows_file_order() {
    let resolver = resolver(Arc::default(), Arc::default());

    assert_eq!(
        resolver.help_text(),
        "https://gitlab.work.example/vendor/name; https://gitlab.com/vendor/name"
    );
    assert!(resolver.matches("https://gitlab.com/acme/widgets"));
}
