//! Application state for dnsctl.
//!
//! Built once in `main` from the resolved [`Config`] and handed to every
//! command handler. The session store is shared between the API client (which
//! reads it on every request) and the login/logout commands (which write it).

use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::config::{Config, SessionBackend};
use crate::notify::FailureSink;
use crate::session::{FileSessionStore, SessionStore};

pub struct AppState {
    /// HTTP client for the DNS platform API.
    pub api: Arc<ApiClient>,

    /// Persisted operator session.
    pub sessions: Arc<dyn SessionStore>,

    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, sink: Arc<dyn FailureSink>) -> Result<Self, String> {
        let sessions = open_store(&config)?;
        Ok(Self::with_store(config, sessions, sink))
    }

    /// Build around an existing session store.
    pub fn with_store(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        let api = ApiClient::new(&config.api_url, config.timeout, sessions.clone(), sink);
        Self {
            api: Arc::new(api),
            sessions,
            config,
        }
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>, String> {
    match config.session_backend {
        SessionBackend::File => {
            log::debug!("Session file: {}", config.session_file.display());
            Ok(Arc::new(FileSessionStore::new(&config.session_file)))
        }
        #[cfg(feature = "keyring")]
        SessionBackend::Keyring => Ok(Arc::new(crate::session::keychain::KeyringSessionStore::new())),
        #[cfg(not(feature = "keyring"))]
        SessionBackend::Keyring => {
            Err("this build has no keyring support; use --session-backend file".to_string())
        }
    }
}
