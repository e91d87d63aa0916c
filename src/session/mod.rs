//! Persisted operator session.
//!
//! The session is a `{name, jwt_token}` pair written at login and read on every
//! outgoing request. It lives under the fixed key [`USERDATA_KEY`] of a small
//! string-keyed store: a JSON file by default, or the OS keyring.

#[cfg(feature = "keyring")]
pub mod keychain;
pub mod token;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key the session is stored under.
pub const USERDATA_KEY: &str = "userdata";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored session is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "keyring")]
    #[error("Keychain operation failed: {0}")]
    Keychain(String),
}

/// The logged-in operator.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    pub name: String,
    #[serde(rename = "jwt_token")]
    pub token: String,
}

impl Session {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
        }
    }

    /// Whether the embedded token has not yet expired.
    pub fn is_valid(&self) -> bool {
        token::is_valid(Some(&self.token))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Synchronous storage capability for the session.
///
/// Injected into the API client and the route guard so tests can substitute
/// an in-memory store.
pub trait SessionStore: Send + Sync {
    /// Read the stored session. `Ok(None)` when nobody is logged in.
    fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Persist `session`, replacing any previous one.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove the stored session. Idempotent.
    fn clear(&self) -> Result<(), SessionError>;
}

/// JSON file holding a flat string-to-string map, one entry per key.
///
/// The session entry's value is itself a JSON document, mirroring how the
/// web console kept it in browser local storage.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/dnsctl/storage.json`, or the working directory when the
    /// platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dnsctl")
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries to rewrite, plus whether an unreadable file was discarded.
    /// A map that no longer parses must not block replacing or removing the
    /// session.
    fn entries_for_write(&self) -> Result<(BTreeMap<String, String>, bool), SessionError> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(SessionError::Json(e)) => {
                log::warn!(
                    "Discarding unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a sibling and rename so a crash never leaves a torn file.
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = open_private(&tmp)?;
            file.write_all(&serde_json::to_vec_pretty(entries)?)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let entries = self.read_entries()?;
        match entries.get(USERDATA_KEY) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let (mut entries, _) = self.entries_for_write()?;
        entries.insert(USERDATA_KEY.to_string(), serde_json::to_string(session)?);
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let (mut entries, discarded) = self.entries_for_write()?;
        if entries.remove(USERDATA_KEY).is_none() && !discarded {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStore {
    inner: std::sync::Mutex<Option<Session>>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: std::sync::Mutex::new(Some(session)),
        }
    }
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.inner.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.inner.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("nested").join("storage.json"))
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Session::new("alice", "T")).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.name, "alice");
        assert_eq!(loaded.token, "T");
    }

    #[test]
    fn test_stored_format_matches_console_userdata() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Session::new("alice", "T")).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let entries: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        let userdata: serde_json::Value = serde_json::from_str(&entries["userdata"]).unwrap();
        assert_eq!(userdata["name"], "alice");
        assert_eq!(userdata["jwt_token"], "T");
    }

    #[test]
    fn test_clear_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"theme":"dark"}"#).unwrap();

        store.save(&Session::new("bob", "X")).unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("theme"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_session_entry_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"userdata":"{not json"}"#).unwrap();
        assert!(matches!(store.load(), Err(SessionError::Json(_))));
    }

    #[test]
    fn test_clear_recovers_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{truncated").unwrap();
        assert!(matches!(store.load(), Err(SessionError::Json(_))));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Idempotent once the file is readable again.
        store.clear().unwrap();
    }

    #[test]
    fn test_save_replaces_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{truncated").unwrap();

        store.save(&Session::new("alice", "T")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.name, "alice");
        assert_eq!(loaded.token, "T");
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("alice", "secret-token");
        let printed = format!("{:?}", session);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("secret-token"));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&Session::new("a", "b")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "b");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
