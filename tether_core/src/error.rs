use std::path::PathBuf;
use thiserror::Error;

/// A completion call failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion service is rate limiting requests")]
    RateLimited,

    #[error("completion service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("completion service returned an empty reply")]
    EmptyResponse,
}

impl GatewayError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited => true,
            Self::Status { status, .. } => *status >= 500,
            Self::MalformedResponse(_) | Self::EmptyResponse => false,
        }
    }
}

/// The transcript store could not durably record or read a message.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("transcript I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode transcript entry: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("corrupt transcript entry at {}:{line}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("transcript store unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(GatewayError::RateLimited.is_retryable());
        assert!(GatewayError::Transport("reset".into()).is_retryable());
        assert!(
            GatewayError::Status {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !GatewayError::Status {
                status: 401,
                body: "bad key".into()
            }
            .is_retryable()
        );
        assert!(!GatewayError::EmptyResponse.is_retryable());
    }
}
