//! Error types for the portal client.
//!
//! ERROR HANDLING
//! ==============
//! Remote failures are classified once, at the HTTP boundary, into the kinds
//! the views react to. Code above `net::api` matches on [`ErrorKind`] rather
//! than raw status codes, and nothing in the crate retries automatically.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Coarse classification used by the failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unknown,
}

impl ErrorKind {
    /// Map an HTTP status onto the portal taxonomy.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            _ => Self::Unknown,
        }
    }
}

/// Failure of a single remote call. Terminal for the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 401: missing or expired credentials.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    /// 403: authenticated but lacking admin rights.
    #[error("forbidden: {body}")]
    Forbidden { body: String },

    /// 404: the addressed record does not exist.
    #[error("not found: {body}")]
    NotFound { body: String },

    /// 409: the request collides with existing data.
    #[error("conflict: {body}")]
    Conflict { body: String },

    /// Any other non-success status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-success response.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match ErrorKind::from_status(status) {
            ErrorKind::Unauthorized => Self::Unauthorized { body },
            ErrorKind::Forbidden => Self::Forbidden { body },
            ErrorKind::NotFound => Self::NotFound { body },
            ErrorKind::Conflict => Self::Conflict { body },
            ErrorKind::Unknown => Self::Status { status, body },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Status { .. } | Self::Transport(_) | Self::Decode(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status of the response, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Server-provided explanation, suitable for a field-level message.
    ///
    /// The API reports failures as `{"detail": "..."}`; anything else is
    /// returned verbatim when non-empty.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let body = match self {
            Self::Unauthorized { body }
            | Self::Forbidden { body }
            | Self::NotFound { body }
            | Self::Conflict { body }
            | Self::Status { body, .. } => body,
            Self::Transport(_) | Self::Decode(_) => return None,
        };
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(detail) = value.get("detail").and_then(serde_json::Value::as_str) {
                return Some(detail.to_owned());
            }
        }
        let trimmed = body.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}

/// Errors raised while building configuration or the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}
