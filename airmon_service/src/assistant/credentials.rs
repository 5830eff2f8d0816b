//! Where the assistant's API key comes from.
//!
//! Providers are tried in order and the first credential wins. When none
//! yields one, the dashboard keeps working with the assistant disabled.

use crate::config::AssistantConfig;
use std::fmt;
use std::path::PathBuf;

/// An API key. Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a key, trimming whitespace. Blank keys are not credentials.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let trimmed = key.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Credential(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(****)")
    }
}

pub trait CredentialProvider {
    fn get(&self) -> Option<Credential>;

    /// Short description for the dashboard, e.g. `env OPENAI_API_KEY`.
    fn describe(&self) -> String;
}

/// Reads the key from an environment variable (after `.env` is loaded).
pub struct EnvCredential {
    pub var: String,
}

impl CredentialProvider for EnvCredential {
    fn get(&self) -> Option<Credential> {
        std::env::var(&self.var).ok().and_then(Credential::new)
    }

    fn describe(&self) -> String {
        format!("env {}", self.var)
    }
}

/// Reads the key from a secret file.
pub struct FileCredential {
    pub path: PathBuf,
}

impl CredentialProvider for FileCredential {
    fn get(&self) -> Option<Credential> {
        std::fs::read_to_string(&self.path).ok().and_then(Credential::new)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// A key entered by the operator during the session.
pub struct SessionCredential {
    key: Option<Credential>,
}

impl SessionCredential {
    pub fn new(key: &str) -> Self {
        SessionCredential { key: Credential::new(key) }
    }
}

impl CredentialProvider for SessionCredential {
    fn get(&self) -> Option<Credential> {
        self.key.clone()
    }

    fn describe(&self) -> String {
        "entered in session".to_string()
    }
}

/// Tries the session key first, then each configured provider in turn.
#[derive(Default)]
pub struct CredentialChain {
    session: Option<SessionCredential>,
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Env var first, then the secret file if one is configured.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let mut chain = Self::new().with(EnvCredential { var: config.api_key_env.clone() });
        if let Some(path) = &config.api_key_file {
            chain = chain.with(FileCredential { path: path.clone() });
        }
        chain
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Sets the operator's session key, replacing any earlier one.
    pub fn set_session_key(&mut self, key: &str) {
        self.session = Some(SessionCredential::new(key));
    }

    fn sources(&self) -> impl Iterator<Item = &dyn CredentialProvider> {
        self.session
            .iter()
            .map(|s| s as &dyn CredentialProvider)
            .chain(self.providers.iter().map(|p| p.as_ref() as &dyn CredentialProvider))
    }

    /// Describes the provider that currently yields a key.
    pub fn active_source(&self) -> Option<String> {
        self.sources().find(|p| p.get().is_some()).map(|p| p.describe())
    }
}

impl CredentialProvider for CredentialChain {
    fn get(&self) -> Option<Credential> {
        self.sources().find_map(|p| p.get())
    }

    fn describe(&self) -> String {
        let sources: Vec<_> = self.sources().map(|p| p.describe()).collect();
        sources.join(", ")
    }
}
