use crate::domain_port::TransportError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RenewalError {
    #[error("renewal transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("renewal timed out after {0:?}")]
    TimedOut(Duration),
    #[error("renewal rejected with status {status}")]
    Rejected { status: u16 },
    #[error("malformed renewal response: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("unauthorized (status {status})")]
    Unauthorized {
        status: u16,
        body: serde_json::Value,
    },
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("session lost: {0}")]
    RenewalFailed(#[from] RenewalError),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("request abandoned before completion")]
    Abandoned,
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { status, .. } | ClientError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            ClientError::Unauthorized { body, .. } | ClientError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Decode(error.to_string())
    }
}
