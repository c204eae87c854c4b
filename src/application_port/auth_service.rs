use crate::application_port::ClientError;
use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("client error: {0}")]
    Client(#[from] ClientError),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginResult {
    pub access: Token,
    pub refresh: Token,
}

/// Identity lifecycle layered on top of the session client.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<CurrentUser, AuthError>;
    async fn current_user(&self) -> Result<CurrentUser, AuthError>;
    /// Startup check: resolves the stored session to a user, or drops it.
    async fn restore(&self) -> Option<CurrentUser>;
    fn logout(&self);
    fn cached_user(&self) -> Option<CurrentUser>;
    fn forget_identity(&self);
}
