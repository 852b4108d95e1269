//! Errors raised by the PC link clients.

use inksync_domain::error::{ExecutionError, InkSyncError};

#[derive(Debug, thiserror::Error)]
pub enum PcLinkError {
    /// The HTTP client could not be built.
    #[error("unable to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The configured agent URL is not a valid base URL.
    #[error("invalid agent URL {0:?}")]
    InvalidUrl(String),

    /// No response from `endpoint`.
    #[error("{endpoint} unreachable: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// `endpoint` did not answer within the client timeout.
    #[error("{endpoint} timed out after {timeout_ms} ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// The agent answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The agent's answer could not be decoded.
    #[error("invalid response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl PcLinkError {
    pub(crate) fn from_send(endpoint: &str, timeout_ms: u64, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms,
            }
        } else {
            Self::Unreachable {
                endpoint: endpoint.to_string(),
                source,
            }
        }
    }
}

impl From<PcLinkError> for ExecutionError {
    fn from(err: PcLinkError) -> Self {
        match err {
            PcLinkError::Timeout { timeout_ms, .. } => Self::Timeout(timeout_ms),
            PcLinkError::Rejected { .. } | PcLinkError::Decode { .. } => {
                Self::Rejected(err.to_string())
            }
            PcLinkError::Client(_) | PcLinkError::InvalidUrl(_) | PcLinkError::Unreachable { .. } => {
                Self::Unreachable(err.to_string())
            }
        }
    }
}

impl From<PcLinkError> for InkSyncError {
    fn from(err: PcLinkError) -> Self {
        Self::Execution(err.into())
    }
}
