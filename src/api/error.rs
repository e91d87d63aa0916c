//! Failure taxonomy of the request pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure, timeout, or an unreadable response body.
    #[error("{path} {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something other than HTTP 200.
    #[error("{path} {status}")]
    Http {
        path: String,
        status: u16,
        request_id: Option<String>,
    },

    /// HTTP 200 with a falsy `status` in the envelope.
    #[error("request_id: {request_id}")]
    Application {
        request_id: String,
        message: Option<String>,
    },

    /// HTTP 200 whose body is not the expected envelope.
    #[error("{path} unexpected response body: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("page_size must be greater than zero")]
    InvalidPageSize,
}

impl ApiError {
    /// Server-assigned id of the failed request, when the server sent one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ApiError::Http { request_id, .. } => request_id.as_deref(),
            ApiError::Application { request_id, .. } if !request_id.is_empty() => {
                Some(request_id)
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { source, .. } if source.is_timeout())
    }

    /// Text for the operator: the report line plus the backend's error, if any.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Application {
                message: Some(message),
                ..
            } => format!("{} ({})", self, message),
            _ => self.to_string(),
        }
    }
}
