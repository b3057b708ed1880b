//! Error types for the client session
//!
//! Every variant is a send/register failure for the caller; the variants only
//! exist so logs can tell a timeout from a refused connection or a rejection.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    /// No response within the request timeout
    #[error("Request to {endpoint} timed out after {timeout_secs}s")]
    Timeout { endpoint: String, timeout_secs: u64 },

    /// Connection refused, DNS failure, reset...
    #[error("Transport error on {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Hub answered with a non-success status
    #[error("Hub rejected request to {endpoint} ({status}): {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Hub answered 2xx but the body was not the expected JSON
    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }

    /// Map a reqwest failure, keeping timeouts apart
    pub(crate) fn from_reqwest(endpoint: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SessionError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_secs,
            }
        } else {
            SessionError::Transport {
                endpoint: endpoint.to_string(),
                source: err,
            }
        }
    }
}
