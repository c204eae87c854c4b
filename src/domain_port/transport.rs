use crate::domain_model::*;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("connect error: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Io(String),
}

/// Sends a fully prepared request. The transport renders the bearer slot
/// but never inspects or alters credentials itself.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<ApiResponse, TransportError>;
}
