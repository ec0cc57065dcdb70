//! Locally persisted bearer credentials

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuthError;

/// Profile returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// Bearer token plus the identity it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

fn bearer() -> String {
    "bearer".to_string()
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: bearer(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// Storage for the session's credentials
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Result<Option<Credentials>, AuthError>;
    fn save(&self, credentials: &Credentials) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Keeps credentials for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            slot: RwLock::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, AuthError> {
        Ok(self.slot.read().clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        *self.slot.write() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.slot.write() = None;
        Ok(())
    }
}

/// Persists credentials as a JSON file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, source: std::io::Error) -> AuthError {
        AuthError::Storage {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path).map_err(|e| self.storage_error(e))?;
        let credentials: Credentials = serde_json::from_str(&json)?;
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
            }
        }
        let json = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, json).map_err(|e| self.storage_error(e))
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error(e)),
        }
    }
}
