//! Credential resolution for the Claude CLI.
//!
//! Resolution order:
//! 1. ANTHROPIC_API_KEY environment variable
//! 2. An already-authenticated `claude` session
//! 3. The saved key in `~/.config/autopr/config.json`
//! 4. An interactive prompt (the entered key is saved for next time)

pub mod store;

use std::env;
use std::fmt;

use async_trait::async_trait;
use dialoguer::Password;
use tracing::{debug, warn};

use crate::config::API_KEY_ENV_VAR;
use crate::error::{AuthError, StoreError};
use crate::exec::{self, Cmd, CommandRunner, ExecOptions};

pub use store::{CredentialStore, SavedCredential};

/// Where the credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Environment,
    CliSession,
    SavedConfig,
    InteractivePrompt,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Environment => "environment",
            AuthMethod::CliSession => "cli-session",
            AuthMethod::SavedConfig => "saved-config",
            AuthMethod::InteractivePrompt => "interactive-prompt",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved credentials for one Claude invocation.
///
/// `key` is `None` exactly when the method is [`AuthMethod::CliSession`].
#[derive(Clone, PartialEq, Eq)]
pub struct AuthResult {
    method: AuthMethod,
    key: Option<String>,
}

impl AuthResult {
    /// Credentials supplied implicitly by a logged-in `claude` session.
    pub fn session() -> Self {
        Self {
            method: AuthMethod::CliSession,
            key: None,
        }
    }

    /// An explicit key obtained through `method`.
    ///
    /// # Panics
    ///
    /// Panics if `method` is [`AuthMethod::CliSession`].
    pub fn with_key(method: AuthMethod, key: impl Into<String>) -> Self {
        assert!(
            method != AuthMethod::CliSession,
            "cli-session credentials carry no key"
        );
        Self {
            method,
            key: Some(key.into()),
        }
    }

    pub fn method(&self) -> AuthMethod {
        self.method
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResult")
            .field("method", &self.method)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Outcome of probing for a logged-in `claude` session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionProbe {
    Available,
    NotAvailable,
}

/// The four credential sources, plus the hook that saves a prompted key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthSources: Send + Sync {
    /// Key from the environment, if set and non-empty.
    fn env_key(&self) -> Option<String>;

    /// Whether the `claude` CLI can authenticate on its own.
    async fn probe_session(&self) -> SessionProbe;

    /// Key from the saved credential file.
    fn saved_key(&self) -> Option<String>;

    /// Ask the user for a key. An empty answer is returned as-is.
    async fn prompt_key(&self) -> Result<String, AuthError>;

    /// Save a prompted key for later runs.
    fn persist_key(&self, key: &str) -> Result<(), StoreError>;
}

/// Walk the sources in priority order and stop at the first that yields.
pub async fn resolve<S: AuthSources + ?Sized>(sources: &S) -> Result<AuthResult, AuthError> {
    if let Some(key) = sources.env_key() {
        debug!("Using API key from {}", API_KEY_ENV_VAR);
        return Ok(AuthResult::with_key(AuthMethod::Environment, key));
    }

    if sources.probe_session().await == SessionProbe::Available {
        debug!("Using existing claude CLI session");
        return Ok(AuthResult::session());
    }

    if let Some(key) = sources.saved_key() {
        debug!("Using saved API key");
        return Ok(AuthResult::with_key(AuthMethod::SavedConfig, key));
    }

    let key = sources.prompt_key().await?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AuthError::KeyRequired);
    }

    if let Err(e) = sources.persist_key(key) {
        warn!("Could not save API key: {}", e);
    }

    Ok(AuthResult::with_key(AuthMethod::InteractivePrompt, key))
}

/// Sources backed by the real environment, `claude`, disk and terminal.
pub struct SystemAuthSources<'a, R: CommandRunner> {
    runner: &'a R,
    store: Option<CredentialStore>,
}

impl<'a, R: CommandRunner> SystemAuthSources<'a, R> {
    /// Use the default credential location.
    ///
    /// When no home directory can be found the saved-config step is
    /// skipped and prompted keys are not persisted.
    pub fn new(runner: &'a R) -> Self {
        let store = match CredentialStore::default_location() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("{}; saved API keys are disabled", e);
                None
            }
        };
        Self { runner, store }
    }

    pub fn with_store(runner: &'a R, store: CredentialStore) -> Self {
        Self {
            runner,
            store: Some(store),
        }
    }
}

#[async_trait]
impl<R: CommandRunner> AuthSources for SystemAuthSources<'_, R> {
    fn env_key(&self) -> Option<String> {
        env::var(API_KEY_ENV_VAR)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    async fn probe_session(&self) -> SessionProbe {
        let probe = exec::capture(
            self.runner,
            &Cmd::new("claude").arg("--version"),
            ExecOptions::default().allow_failure(),
        )
        .await;

        match probe {
            Ok(Some(_)) => SessionProbe::Available,
            _ => SessionProbe::NotAvailable,
        }
    }

    fn saved_key(&self) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.api_key() {
            Ok(key) => key,
            Err(e) => {
                debug!("Ignoring saved credentials: {}", e);
                None
            }
        }
    }

    async fn prompt_key(&self) -> Result<String, AuthError> {
        tokio::task::spawn_blocking(|| {
            Password::new()
                .with_prompt("Enter your Anthropic API key")
                .allow_empty_password(true)
                .interact()
                .map_err(|e| AuthError::PromptFailed(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::PromptFailed(e.to_string()))?
    }

    fn persist_key(&self, key: &str) -> Result<(), StoreError> {
        match &self.store {
            Some(store) => {
                store.save_api_key(key)?;
                println!("API key saved to {}", store.path().display());
                Ok(())
            }
            None => Err(StoreError::NoHomeDir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecOutput, MockCommandRunner};

    #[tokio::test]
    async fn test_env_key_wins_and_nothing_else_is_consulted() {
        let mut sources = MockAuthSources::new();
        sources
            .expect_env_key()
            .returning(|| Some("sk-env".to_string()));
        sources.expect_probe_session().never();
        sources.expect_saved_key().never();
        sources.expect_prompt_key().never();
        sources.expect_persist_key().never();

        let auth = resolve(&sources).await.unwrap();
        assert_eq!(auth.method(), AuthMethod::Environment);
        assert_eq!(auth.key(), Some("sk-env"));
    }

    #[tokio::test]
    async fn test_session_used_before_saved_key() {
        let mut sources = MockAuthSources::new();
        sources.expect_env_key().returning(|| None);
        sources
            .expect_probe_session()
            .times(1)
            .returning(|| SessionProbe::Available);
        sources.expect_saved_key().never();
        sources.expect_prompt_key().never();

        let auth = resolve(&sources).await.unwrap();
        assert_eq!(auth.method(), AuthMethod::CliSession);
        assert!(auth.key().is_none());
    }

    #[tokio::test]
    async fn test_saved_key_used_when_no_session() {
        let mut sources = MockAuthSources::new();
        sources.expect_env_key().returning(|| None);
        sources
            .expect_probe_session()
            .returning(|| SessionProbe::NotAvailable);
        sources
            .expect_saved_key()
            .returning(|| Some("sk-saved".to_string()));
        sources.expect_prompt_key().never();

        let auth = resolve(&sources).await.unwrap();
        assert_eq!(auth.method(), AuthMethod::SavedConfig);
        assert_eq!(auth.key(), Some("sk-saved"));
    }

    #[tokio::test]
    async fn test_prompted_key_is_persisted() {
        let mut sources = MockAuthSources::new();
        sources.expect_env_key().returning(|| None);
        sources
            .expect_probe_session()
            .returning(|| SessionProbe::NotAvailable);
        sources.expect_saved_key().returning(|| None);
        sources
            .expect_prompt_key()
            .returning(|| Ok("  sk-typed \n".to_string()));
        sources
            .expect_persist_key()
            .withf(|key| key == "sk-typed")
            .times(1)
            .returning(|_| Ok(()));

        let auth = resolve(&sources).await.unwrap();
        assert_eq!(auth.method(), AuthMethod::InteractivePrompt);
        assert_eq!(auth.key(), Some("sk-typed"));
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_fatal() {
        let mut sources = MockAuthSources::new();
        sources.expect_env_key().returning(|| None);
        sources
            .expect_probe_session()
            .returning(|| SessionProbe::NotAvailable);
        sources.expect_saved_key().returning(|| None);
        sources
            .expect_prompt_key()
            .returning(|| Ok("sk-typed".to_string()));
        sources
            .expect_persist_key()
            .returning(|_| Err(StoreError::NoHomeDir));

        let auth = resolve(&sources).await.unwrap();
        assert_eq!(auth.method(), AuthMethod::InteractivePrompt);
    }

    #[tokio::test]
    async fn test_empty_prompt_requires_key() {
        let mut sources = MockAuthSources::new();
        sources.expect_env_key().returning(|| None);
        sources
            .expect_probe_session()
            .returning(|| SessionProbe::NotAvailable);
        sources.expect_saved_key().returning(|| None);
        sources.expect_prompt_key().returning(|| Ok("   ".to_string()));
        sources.expect_persist_key().never();

        let err = resolve(&sources).await.unwrap_err();
        assert!(matches!(err, AuthError::KeyRequired));
    }

    #[test]
    fn test_auth_result_debug_redacts_key() {
        let auth = AuthResult::with_key(AuthMethod::SavedConfig, "sk-secret");
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    #[should_panic(expected = "cli-session credentials carry no key")]
    fn test_session_with_key_panics() {
        let _ = AuthResult::with_key(AuthMethod::CliSession, "sk");
    }

    #[test]
    fn test_system_env_key_ignores_blank() {
        let runner = MockCommandRunner::new();
        let dir = tempfile::tempdir().unwrap();
        let sources =
            SystemAuthSources::with_store(&runner, CredentialStore::new(dir.path().join("c.json")));

        temp_env::with_var(API_KEY_ENV_VAR, Some("  "), || {
            assert!(sources.env_key().is_none());
        });
        temp_env::with_var(API_KEY_ENV_VAR, Some("sk-env"), || {
            assert_eq!(sources.env_key().as_deref(), Some("sk-env"));
        });
    }

    #[tokio::test]
    async fn test_system_probe_session() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.starts_with(&["claude", "--version"]))
            .times(1)
            .returning(|_, _| Ok(ExecOutput::ok("1.0.0 (Claude Code)\n")));
        let dir = tempfile::tempdir().unwrap();
        let sources =
            SystemAuthSources::with_store(&runner, CredentialStore::new(dir.path().join("c.json")));

        assert_eq!(sources.probe_session().await, SessionProbe::Available);
    }

    #[tokio::test]
    async fn test_system_probe_session_failure() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_, _| Ok(ExecOutput::failed(1, "not logged in")));
        let dir = tempfile::tempdir().unwrap();
        let sources =
            SystemAuthSources::with_store(&runner, CredentialStore::new(dir.path().join("c.json")));

        assert_eq!(sources.probe_session().await, SessionProbe::NotAvailable);
    }

    #[test]
    fn test_system_saved_key_ignores_corrupt_file() {
        let runner = MockCommandRunner::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, "{broken").unwrap();
        let sources = SystemAuthSources::with_store(&runner, CredentialStore::new(&path));

        assert!(sources.saved_key().is_none());
    }
}
