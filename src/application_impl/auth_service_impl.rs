use super::session_client::send_once;
use crate::application_impl::SessionClient;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AuthPaths {
    pub login: String,
    pub me: String,
}

pub struct AuthServiceImpl {
    client: SessionClient,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    paths: AuthPaths,
    identity: Mutex<Option<CurrentUser>>,
}

impl AuthServiceImpl {
    pub fn new(
        client: SessionClient,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        paths: AuthPaths,
    ) -> Self {
        Self {
            client,
            transport,
            credentials,
            paths,
            identity: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl AuthService for AuthServiceImpl {
    async fn login(&self, request: LoginInput) -> Result<CurrentUser, AuthError> {
        // The login exchange carries no credential, so it skips the pipeline.
        let outbound = OutboundRequest::post(self.paths.login.as_str())
            .with_json(&request)
            .map_err(|e| AuthError::Decode(e.to_string()))?;

        let tokens: LoginResult = match send_once(self.transport.as_ref(), &outbound).await {
            Ok(response) => response
                .json()
                .map_err(|e| AuthError::Decode(e.to_string()))?,
            Err(ClientError::Unauthorized { .. }) | Err(ClientError::Status { status: 400, .. }) => {
                tracing::info!(username = %request.username, "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        self.credentials
            .set(CredentialPair::new(tokens.access, tokens.refresh));
        tracing::info!(username = %request.username, "logged in");

        self.current_user().await
    }

    async fn current_user(&self) -> Result<CurrentUser, AuthError> {
        let user: CurrentUser = self.client.get_json(&self.paths.me).await?;
        *self.identity.lock() = Some(user.clone());
        Ok(user)
    }

    async fn restore(&self) -> Option<CurrentUser> {
        if self.credentials.snapshot().is_empty() {
            return None;
        }
        match self.current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "stored session is unusable");
                self.logout();
                None
            }
        }
    }

    fn logout(&self) {
        self.credentials.clear();
        self.forget_identity();
        tracing::info!("logged out");
    }

    fn cached_user(&self) -> Option<CurrentUser> {
        self.identity.lock().clone()
    }

    fn forget_identity(&self) {
        self.identity.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{RenewalConfig, SessionEvents};
    use crate::infra::{FakeTransport, MemoryCredentialStore};

    fn fake_api() -> Arc<FakeTransport> {
        Arc::new(FakeTransport::new(|request: OutboundRequest| async move {
            let response = match request.route() {
                "/api/auth/login/" => {
                    let body = request.body.clone().unwrap_or_default();
                    if body["password"] == "hunter2" {
                        ApiResponse::ok(serde_json::json!({ "access": "a1", "refresh": "r1" }))
                    } else {
                        ApiResponse::unauthorized()
                    }
                }
                "/api/auth/me/" if request.authorization().as_deref() == Some("Bearer a1") => {
                    ApiResponse::ok(serde_json::json!({ "id": 5, "username": "sam", "role": "PARENT" }))
                }
                _ => ApiResponse::unauthorized(),
            };
            Ok(response)
        }))
    }

    fn service(
        transport: Arc<FakeTransport>,
        store: Arc<MemoryCredentialStore>,
    ) -> AuthServiceImpl {
        let client = SessionClient::new(
            transport.clone(),
            store.clone(),
            Arc::new(SessionEvents::new()),
            RenewalConfig::new("/api/auth/refresh/"),
        );
        AuthServiceImpl::new(
            client,
            transport,
            store,
            AuthPaths {
                login: "/api/auth/login/".into(),
                me: "/api/auth/me/".into(),
            },
        )
    }

    fn input(password: &str) -> LoginInput {
        LoginInput {
            username: "sam".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_seeds_store_and_identity() {
        let transport = fake_api();
        let store = Arc::new(MemoryCredentialStore::new());
        let service = service(transport.clone(), store.clone());

        let user = service.login(input("hunter2")).await.unwrap();

        assert_eq!(user.role, Role::Parent);
        assert_eq!(store.snapshot(), CredentialPair::new("a1", "r1"));
        assert_eq!(service.cached_user(), Some(user));
        assert!(transport.sent_to("/api/auth/login/")[0].bearer.is_none());
    }

    #[tokio::test]
    async fn test_bad_password_is_invalid_credentials() {
        let transport = fake_api();
        let store = Arc::new(MemoryCredentialStore::new());
        let service = service(transport.clone(), store.clone());

        let result = service.login(input("wrong")).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(store.snapshot().is_empty());
        assert_eq!(transport.count("/api/auth/refresh/"), 0);
    }

    #[tokio::test]
    async fn test_restore_without_session_skips_network() {
        let transport = fake_api();
        let service = service(transport.clone(), Arc::new(MemoryCredentialStore::new()));

        assert!(service.restore().await.is_none());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_restore_with_dead_session_logs_out() {
        let transport = fake_api();
        let store = Arc::new(MemoryCredentialStore::seeded(CredentialPair::access_only("stale")));
        let service = service(transport, store.clone());

        assert!(service.restore().await.is_none());
        assert!(store.snapshot().is_empty());
        assert!(service.cached_user().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let transport = fake_api();
        let store = Arc::new(MemoryCredentialStore::new());
        let service = service(transport, store.clone());
        service.login(input("hunter2")).await.unwrap();

        service.logout();
        service.logout();

        assert!(store.snapshot().is_empty());
        assert!(service.cached_user().is_none());
    }
}
