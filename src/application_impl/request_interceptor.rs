use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

/// Attach stage of the client pipeline.
#[derive(Clone)]
pub struct RequestInterceptor {
    credentials: Arc<dyn CredentialStore>,
}

impl RequestInterceptor {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Sets the bearer slot from the store. Without an access token the
    /// request is left untouched.
    pub fn attach(&self, request: &mut OutboundRequest) {
        if let Some(token) = self.credentials.access() {
            request.bearer = Some(token);
        }
    }

    pub fn attach_token(&self, request: &mut OutboundRequest, token: &Token) {
        request.bearer = Some(token.clone());
    }
}
