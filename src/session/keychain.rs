//! OS keyring backend for the session.
//!
//! Uses the `keyring` crate (macOS Keychain, Secret Service, Windows
//! Credential Manager). The session JSON is stored as the entry's password so
//! the token never touches disk in plain text.

use keyring::Entry;

use super::{Session, SessionError, SessionStore, USERDATA_KEY};

/// Keyring service name.
const SERVICE_NAME: &str = "dnsctl";

impl From<keyring::Error> for SessionError {
    fn from(err: keyring::Error) -> Self {
        SessionError::Keychain(err.to_string())
    }
}

pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, SessionError> {
        Ok(Entry::new(&self.service, USERDATA_KEY)?)
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringSessionStore {
    /// Returns `None` if no entry exists (never logged in, or logged out).
    fn load(&self) -> Result<Option<Session>, SessionError> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let raw = serde_json::to_string(session)?;
        self.entry()?.set_password(&raw)?;
        Ok(())
    }

    /// Ignores `NoEntry` (already deleted or never stored).
    fn clear(&self) -> Result<(), SessionError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
