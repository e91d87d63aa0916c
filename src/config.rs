//! Runtime configuration.
//!
//! Each setting is taken from its command-line flag, then the environment
//! (after `.env` has been loaded), then a built-in default.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use thiserror::Error;

use crate::api::client::DEFAULT_TIMEOUT;
use crate::api::pagination::DEFAULT_PAGE_SIZE;
use crate::session::FileSessionStore;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be `file` or `keyring`, got {value:?}")]
    InvalidBackend { var: &'static str, value: String },
    #[error("page size must be at least 1")]
    ZeroPageSize,
    #[error("timeout must be at least 1 ms")]
    ZeroTimeout,
}

/// Where the session is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
}

impl FromStr for SessionBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            _ => Err(()),
        }
    }
}

/// Values given on the command line; `None` falls through to the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub page_size: Option<u64>,
    pub session_backend: Option<SessionBackend>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub page_size: u64,
    pub session_backend: SessionBackend,
    pub session_file: PathBuf,
}

impl Config {
    /// Resolve against the process environment.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve<F>(overrides: Overrides, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // API base URL: --api-url > DNSCTL_API_URL > VITE_API_URL > default
        let api_url = overrides
            .api_url
            .or_else(|| env("DNSCTL_API_URL"))
            .or_else(|| env("VITE_API_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_ms = match overrides.timeout_ms {
            Some(ms) => ms,
            None => number_from_env(&env, "DNSCTL_TIMEOUT_MS")?
                .unwrap_or(DEFAULT_TIMEOUT.as_millis() as u64),
        };
        if timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let page_size = match overrides.page_size {
            Some(size) => size,
            None => number_from_env(&env, "DNSCTL_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }

        let session_backend = match overrides.session_backend {
            Some(backend) => backend,
            None => match env("DNSCTL_SESSION_BACKEND") {
                Some(value) => value.parse().map_err(|_| ConfigError::InvalidBackend {
                    var: "DNSCTL_SESSION_BACKEND",
                    value,
                })?,
                None => SessionBackend::default(),
            },
        };

        let session_file = env("DNSCTL_SESSION_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(FileSessionStore::default_path);

        Ok(Self {
            api_url,
            timeout: Duration::from_millis(timeout_ms),
            page_size,
            session_backend,
            session_file,
        })
    }
}

fn number_from_env<F>(env: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    env(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { var, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(Overrides::default(), env_of(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.page_size, 100);
        assert_eq!(config.session_backend, SessionBackend::File);
        assert!(config.session_file.ends_with("dnsctl/storage.json"));
    }

    #[test]
    fn test_api_url_precedence() {
        let env = env_of(&[
            ("DNSCTL_API_URL", "http://dns.internal"),
            ("VITE_API_URL", "http://vite.internal"),
        ]);
        let config = Config::resolve(Overrides::default(), &env).unwrap();
        assert_eq!(config.api_url, "http://dns.internal");

        let config = Config::resolve(
            Overrides {
                api_url: Some("http://flag.internal".into()),
                ..Default::default()
            },
            &env,
        )
        .unwrap();
        assert_eq!(config.api_url, "http://flag.internal");

        let config =
            Config::resolve(Overrides::default(), env_of(&[("VITE_API_URL", "http://vite")]))
                .unwrap();
        assert_eq!(config.api_url, "http://vite");
    }

    #[test]
    fn test_numbers_from_env() {
        let env = env_of(&[("DNSCTL_TIMEOUT_MS", "1500"), ("DNSCTL_PAGE_SIZE", " 20 ")]);
        let config = Config::resolve(Overrides::default(), env).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = Config::resolve(
            Overrides::default(),
            env_of(&[("DNSCTL_PAGE_SIZE", "lots")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: "DNSCTL_PAGE_SIZE",
                value: "lots".into()
            }
        );
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = Config::resolve(
            Overrides {
                page_size: Some(0),
                ..Default::default()
            },
            env_of(&[]),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroPageSize);
    }

    #[test]
    fn test_session_backend_and_file() {
        let env = env_of(&[
            ("DNSCTL_SESSION_BACKEND", "Keyring"),
            ("DNSCTL_SESSION_FILE", "/tmp/dnsctl.json"),
        ]);
        let config = Config::resolve(Overrides::default(), env).unwrap();
        assert_eq!(config.session_backend, SessionBackend::Keyring);
        assert_eq!(config.session_file, PathBuf::from("/tmp/dnsctl.json"));

        let err = Config::resolve(
            Overrides::default(),
            env_of(&[("DNSCTL_SESSION_BACKEND", "redis")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBackend { .. }));
    }
}
