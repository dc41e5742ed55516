//! Session persistence backends.
//!
//! The persisted document has the shape `{ "state": { "token", "user" } }`
//! (plus an optional `refresh_token`), the same layout the browser dashboard
//! kept under its single storage key, so an exported browser session can be
//! dropped in as-is.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tenantdesk_core::User;

use super::{Session, SessionError};

/// Where the session document lives between runs.
pub trait SessionStorage: Send + Sync {
    /// Read the persisted document, `None` if nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or the document does
    /// not parse.
    fn load(&self) -> Result<Option<SessionDocument>, SessionError>;

    /// Replace the persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, document: &SessionDocument) -> Result<(), SessionError>;

    /// Forget the persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Persisted session document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub state: PersistedState,
}

/// Inner `state` object of the persisted document.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for PersistedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedState")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SessionDocument {
    /// Document for an authenticated session.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            state: PersistedState {
                token: Some(session.token.expose_secret().to_owned()),
                user: Some(session.user.clone()),
                refresh_token: session
                    .refresh_token
                    .as_ref()
                    .map(|t| t.expose_secret().to_owned()),
            },
        }
    }

    /// Rebuild a session, if the document describes a usable one.
    ///
    /// Both a non-blank token and a user are required.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        let PersistedState {
            token,
            user,
            refresh_token,
        } = self.state;

        let token = token.filter(|t| !t.trim().is_empty())?;
        let user = user?;

        Some(Session {
            token: token.into(),
            refresh_token: refresh_token.filter(|t| !t.trim().is_empty()).map(Into::into),
            user,
        })
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by the file at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<SessionDocument>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, document: &SessionDocument) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a half-written token file
        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_vec_pretty(document)?;
        remove_if_exists(&tmp)?;
        if let Err(e) =
            write_private(&tmp, &contents).and_then(|()| fs::rename(&tmp, &self.path))
        {
            // No token copy may outlive a failed save
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        Ok(remove_if_exists(&self.path)?)
    }
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Create `path` readable by the owner only, then write `contents`.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage, for tests and short-lived embeddings.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<SessionDocument>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a document, as if persisted by an earlier run.
    #[must_use]
    pub fn with_document(document: SessionDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<SessionDocument>, SessionError> {
        self.document
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| SessionError::Unavailable(e.to_string()))
    }

    fn save(&self, document: &SessionDocument) -> Result<(), SessionError> {
        let mut guard = self
            .document
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        *guard = Some(document.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self
            .document
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({"id": 1, "email": "ops@example.com"})).unwrap()
    }

    #[test]
    fn test_document_requires_token_and_user() {
        let mut doc = SessionDocument::default();
        assert!(doc.clone().into_session().is_none());

        doc.state.token = Some("abc".to_string());
        assert!(doc.clone().into_session().is_none());

        doc.state.user = Some(user());
        assert!(doc.clone().into_session().is_some());

        doc.state.token = Some("   ".to_string());
        assert!(doc.into_session().is_none());
    }

    #[test]
    fn test_document_shape_matches_browser_storage() {
        let raw = r#"{"state":{"token":"tok","user":{"id":"1","email":"ops@example.com"},"isAuthenticated":true},"version":0}"#;
        let doc: SessionDocument = serde_json::from_str(raw).unwrap();
        let session = doc.into_session().unwrap();
        assert_eq!(session.user.email, "ops@example.com");
        assert!(session.refresh_token.is_none());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("auth-storage.json"));

        assert!(storage.load().unwrap().is_none());

        let session = Session {
            token: "tok".into(),
            refresh_token: Some("ref".into()),
            user: user(),
        };
        storage.save(&SessionDocument::from_session(&session)).unwrap();

        let loaded = storage.load().unwrap().unwrap().into_session().unwrap();
        assert_eq!(loaded.token.expose_secret(), "tok");
        assert_eq!(loaded.refresh_token.unwrap().expose_secret(), "ref");

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // Clearing twice is fine
        storage.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-storage.json");
        let storage = FileStorage::new(&path);
        let session = Session {
            token: "tok".into(),
            refresh_token: None,
            user: user(),
        };

        // Leftover from an interrupted save, created with the default mode
        fs::write(path.with_extension("json.tmp"), "stale").unwrap();
        storage.save(&SessionDocument::from_session(&session)).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_save_leaves_no_token_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-storage.json");
        // A non-empty directory in the way makes the final rename fail
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        let session = Session {
            token: "tok".into(),
            refresh_token: None,
            user: user(),
        };

        let result = FileStorage::new(&path).save(&SessionDocument::from_session(&session));

        assert!(matches!(result, Err(SessionError::Io(_))));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-storage.json");
        fs::write(&path, "not json").unwrap();

        let result = FileStorage::new(path).load();
        assert!(matches!(result, Err(SessionError::Serialization(_))));
    }

    #[test]
    fn test_persisted_state_debug_redacts_tokens() {
        let doc = SessionDocument {
            state: PersistedState {
                token: Some("super-secret".to_string()),
                user: None,
                refresh_token: Some("also-secret".to_string()),
            },
        };
        let debug = format!("{doc:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
    }
}
