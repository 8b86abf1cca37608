// ABOUTME: Explicit session state for the signed-in user
// SessionContext is passed to the app and CLI; SessionStore persists it between runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::UserDetails;
use crate::credentials::{self, CredentialKey};

/// Environment variable that overrides the stored token for scripted use
pub const TOKEN_ENV: &str = "CARDIOCHECK_TOKEN";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Failed to access session file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Token and cached user of the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
    user: Option<UserDetails>,
    established_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session after login or registration
    pub fn establish(&mut self, token: impl Into<String>, user: Option<UserDetails>) {
        self.token = Some(token.into());
        self.user = user;
        self.established_at = Some(Utc::now());
        info!("Session established");
    }

    /// Drop token and user; the context is unauthenticated afterwards
    pub fn teardown(&mut self) {
        if self.token.take().is_some() {
            info!("Session torn down");
        }
        self.user = None;
        self.established_at = None;
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn require_bearer(&self) -> Result<&str, SessionError> {
        self.bearer().ok_or(SessionError::NotLoggedIn)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&UserDetails> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: UserDetails) {
        self.user = Some(user);
    }

    pub fn established_at(&self) -> Option<DateTime<Utc>> {
        self.established_at
    }
}

/// Where the token lives between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStorage {
    /// OS keychain; the session file holds only the cached user
    Keychain,
    /// Token written into the session file itself
    SessionFile,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CachedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default)]
    user: Option<UserDetails>,
    #[serde(default)]
    established_at: Option<DateTime<Utc>>,
}

/// Persists a `SessionContext` across runs
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    storage: TokenStorage,
}

impl SessionStore {
    /// Keychain-backed store with the user cache at ~/.cardiocheck/session.json
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::base_dir()?.join("session.json"), TokenStorage::Keychain))
    }

    pub fn new(path: impl Into<PathBuf>, storage: TokenStorage) -> Self {
        Self {
            path: path.into(),
            storage,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the last session. `CARDIOCHECK_TOKEN` wins over the stored token.
    pub fn load(&self) -> Result<SessionContext, SessionError> {
        let cached = self.read_cache()?;

        let token = match std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                debug!("Using token from {}", TOKEN_ENV);
                Some(token)
            }
            None => match self.storage {
                TokenStorage::Keychain => credentials::get_credential(CredentialKey::ApiToken)
                    .map_err(|e| SessionError::Keychain(format!("{:#}", e)))?,
                TokenStorage::SessionFile => cached.token,
            },
        };

        Ok(SessionContext {
            user: token.as_ref().and(cached.user),
            established_at: token.as_ref().and(cached.established_at),
            token,
        })
    }

    pub fn save(&self, session: &SessionContext) -> Result<(), SessionError> {
        let token = session.require_bearer()?;

        let cached = CachedSession {
            token: match self.storage {
                TokenStorage::Keychain => {
                    credentials::store_credential(CredentialKey::ApiToken, token)
                        .map_err(|e| SessionError::Keychain(format!("{:#}", e)))?;
                    None
                }
                TokenStorage::SessionFile => Some(token.to_string()),
            },
            user: session.user.clone(),
            established_at: session.established_at,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let content = serde_json::to_string_pretty(&cached).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, content).map_err(|source| self.io_error(source))?;

        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// Forget the persisted session
    pub fn clear(&self) -> Result<(), SessionError> {
        if self.storage == TokenStorage::Keychain {
            credentials::delete_credential(CredentialKey::ApiToken)
                .map_err(|e| SessionError::Keychain(format!("{:#}", e)))?;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn read_cache(&self) -> Result<CachedSession, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CachedSession::default()),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_str(&content).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user() -> UserDetails {
        UserDetails {
            email: "ana@example.com".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: None,
            username: Some("ana".to_string()),
            phone_number: None,
        }
    }

    #[test]
    fn test_establish_and_teardown() {
        let mut session = SessionContext::new();
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_bearer(), Err(SessionError::NotLoggedIn)));

        session.establish("tok", Some(user()));
        assert_eq!(session.bearer(), Some("tok"));
        assert_eq!(session.user().map(|u| u.email.as_str()), Some("ana@example.com"));
        assert!(session.established_at().is_some());

        session.teardown();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("session.json"), TokenStorage::SessionFile);

        let mut session = SessionContext::new();
        session.establish("tok-123", Some(user()));
        store.save(&session).unwrap();

        let restored = store.load().unwrap();
        assert_eq!(restored, session);

        store.clear().unwrap();
        assert!(!store.load().unwrap().is_authenticated());
    }

    #[test]
    fn test_missing_file_is_logged_out() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("none.json"), TokenStorage::SessionFile);
        assert!(!store.load().unwrap().is_authenticated());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_corrupt_file_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(path, TokenStorage::SessionFile);
        assert!(matches!(store.load(), Err(SessionError::Corrupt { .. })));
    }

    #[test]
    fn test_save_requires_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("session.json"), TokenStorage::SessionFile);
        assert!(matches!(store.save(&SessionContext::new()), Err(SessionError::NotLoggedIn)));
    }
}
