//! Session credential storage.
//!
//! The credential is owned by the host application. The idle monitor only
//! ever removes it (through a [`SessionSink`](crate::sink::SessionSink)); the
//! session gate checks for its existence before starting observation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// File name used inside the guard's config directory.
pub const CREDENTIAL_FILE_NAME: &str = "credential.json";

// ── Credential ────────────────────────────────────────────────────────────────

/// Opaque auth token plus the profile shown in the host's top bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub username: String,
    #[serde(default = "default_user_type")]
    pub user_type: String,
    pub issued_at: DateTime<Utc>,
}

fn default_user_type() -> String {
    "staff".to_string()
}

impl Credential {
    /// Build a credential issued right now.
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            user_type: default_user_type(),
            issued_at: Utc::now(),
        }
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user_type = user_type.into();
        self
    }
}

// ── CredentialStore ───────────────────────────────────────────────────────────

/// Where the host keeps its session credential.
pub trait CredentialStore: Send + Sync {
    /// Load the stored credential, `None` when signed out.
    fn load(&self) -> Result<Option<Credential>>;

    /// Persist `credential`, replacing any previous one.
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Remove the stored credential. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;

    /// Whether a credential is currently stored.
    fn has_credential(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }
}

// ── FileCredentialStore ───────────────────────────────────────────────────────

/// JSON file-backed store, `~/.session-guard/credential.json` by default.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted at the default config directory.
    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    /// `~/.session-guard/credential.json`.
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Credential path rooted at `base_dir` (used for testing).
    pub fn path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".session-guard").join(CREDENTIAL_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> GuardError {
        GuardError::CredentialWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(GuardError::CredentialRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let json = serde_json::to_string_pretty(credential)?;

        // Write to a temp file then rename for atomicity.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| self.write_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.write_error(e))?;

        tracing::debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "credential removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_error(e)),
        }
    }
}

// ── MemoryCredentialStore ─────────────────────────────────────────────────────

/// In-process store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out signed in.
    pub fn signed_in(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>> {
        self.slot
            .lock()
            .map_err(|_| GuardError::Other(anyhow::anyhow!("credential store lock poisoned")))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.lock()? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.take();
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
