//! Local, optimistic validity check of the session JWT.
//!
//! The payload is decoded without signature verification; the backend verifies
//! the token on every request. This check only decides whether it is worth
//! sending requests at all or whether the operator must log in again.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid JWT format")]
    Malformed,
    #[error("Failed to decode JWT payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to parse JWT payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims issued by the backend (`username` plus the registered `exp`/`iss`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
}

/// Decode the payload segment of a JWT.
pub fn decode_claims(token: &str) -> Result<Claims, DecodeError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DecodeError::Malformed);
    };

    // Tolerate producers that pad the base64url payload.
    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&decoded)?)
}

/// Validity against the wall clock.
pub fn is_valid(token: Option<&str>) -> bool {
    is_valid_at(token, now_secs())
}

/// Validity at `now` (seconds since the epoch).
///
/// A token is valid only if it decodes, carries an `exp` claim, and that
/// claim is strictly in the future.
pub fn is_valid_at(token: Option<&str>, now: i64) -> bool {
    let Some(token) = token else {
        return false;
    };
    match decode_claims(token) {
        Ok(Claims { exp: Some(exp), .. }) => exp > now,
        Ok(_) => false,
        Err(e) => {
            log::debug!("Session token rejected: {}", e);
            false
        }
    }
}

/// Seconds since the epoch, truncated.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) fn make_token(payload: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"HS256\",\"typ\":\"JWT\"}");
    let payload = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    format!("{}.{}.fake-signature", header, payload)
}
