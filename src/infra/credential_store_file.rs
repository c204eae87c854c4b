use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    #[serde(flatten)]
    pair: CredentialPair,
    updated_at: DateTime<Utc>,
}

/// Credential store that mirrors every change to a JSON file, so a session
/// outlives the process. The in-memory copy is authoritative.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    pair: RwLock<CredentialPair>,
}

impl FileCredentialStore {
    /// Loads an existing session file if there is one. An unreadable or
    /// corrupt file starts an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pair = match std::fs::read(&path) {
            Ok(raw) => match serde_json::from_slice::<StoredSession>(&raw) {
                Ok(stored) => {
                    tracing::debug!(path = %path.display(), updated_at = %stored.updated_at, "session loaded");
                    stored.pair
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                    CredentialPair::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CredentialPair::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read session file");
                CredentialPair::default()
            }
        };

        Self {
            path,
            pair: RwLock::new(pair),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, pair: &CredentialPair) {
        let stored = StoredSession {
            pair: pair.clone(),
            updated_at: Utc::now(),
        };
        if let Err(e) = write_session(&self.path, &stored) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not persist session");
        }
    }
}

fn write_session(path: &Path, stored: &StoredSession) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(stored)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

impl CredentialStore for FileCredentialStore {
    fn access(&self) -> Option<Token> {
        self.pair.read().access.clone()
    }

    fn refresh(&self) -> Option<Token> {
        self.pair.read().refresh.clone()
    }

    fn snapshot(&self) -> CredentialPair {
        self.pair.read().clone()
    }

    fn set(&self, update: CredentialPair) {
        let mut pair = self.pair.write();
        pair.merge(update);
        // Written under the guard so the file never reverts to an older pair.
        self.persist(&pair);
    }

    fn clear(&self) {
        let mut pair = self.pair.write();
        *pair = CredentialPair::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileCredentialStore::open(&path);
        assert!(store.snapshot().is_empty());
        store.set(CredentialPair::new("a1", "r1"));
        store.set(CredentialPair::access_only("a2"));

        let reopened = FileCredentialStore::open(&path);
        assert_eq!(reopened.snapshot(), CredentialPair::new("a2", "r1"));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileCredentialStore::open(&path);
        store.set(CredentialPair::new("a1", "r1"));
        assert!(path.exists());

        store.clear();
        store.clear();
        assert!(!path.exists());
        assert!(FileCredentialStore::open(&path).snapshot().is_empty());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileCredentialStore::open(&path);
        assert!(store.snapshot().is_empty());
    }
}
