use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// The shared authenticated client: attach stage, network, failure stage.
#[derive(Clone)]
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    interceptor: RequestInterceptor,
    coordinator: RenewalCoordinator,
}

impl SessionClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        events: Arc<SessionEvents>,
        config: RenewalConfig,
    ) -> Self {
        let interceptor = RequestInterceptor::new(credentials.clone());
        let coordinator = RenewalCoordinator::new(
            transport.clone(),
            credentials,
            interceptor.clone(),
            events,
            config,
        );
        Self {
            transport,
            interceptor,
            coordinator,
        }
    }

    pub fn renewal_snapshot(&self) -> RenewalSnapshot {
        self.coordinator.snapshot()
    }

    pub async fn execute(&self, mut request: OutboundRequest) -> Result<ApiResponse, ClientError> {
        self.interceptor.attach(&mut request);
        tracing::debug!(method = %request.method, path = %request.path, authenticated = request.bearer.is_some(), "request");

        match send_once(self.transport.as_ref(), &request).await {
            Err(error) if error.is_unauthorized() => self.coordinator.recover(request, error).await,
            other => other,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.execute(OutboundRequest::get(path)).await?;
        Ok(response.json()?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(OutboundRequest::post(path).with_json(body)?)
            .await?;
        Ok(response.json()?)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(OutboundRequest::put(path).with_json(body)?)
            .await?;
        Ok(response.json()?)
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(OutboundRequest::patch(path).with_json(body)?)
            .await?;
        Ok(response.json()?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(OutboundRequest::delete(path)).await?;
        Ok(())
    }
}

/// One trip over the transport, classified: 2xx is success, 401 is
/// `Unauthorized`, anything else is `Status`.
pub(crate) async fn send_once(
    transport: &dyn Transport,
    request: &OutboundRequest,
) -> Result<ApiResponse, ClientError> {
    let response = transport.send(request).await?;
    if response.is_success() {
        Ok(response)
    } else if response.is_unauthorized() {
        Err(ClientError::Unauthorized {
            status: response.status,
            body: response.body,
        })
    } else {
        Err(ClientError::Status {
            status: response.status,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{FakeTransport, MemoryCredentialStore};

    fn client(transport: Arc<FakeTransport>, pair: CredentialPair) -> SessionClient {
        SessionClient::new(
            transport,
            Arc::new(MemoryCredentialStore::seeded(pair)),
            Arc::new(SessionEvents::new()),
            RenewalConfig::new("/api/auth/refresh/"),
        )
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let transport = Arc::new(FakeTransport::always(ApiResponse::ok(
            serde_json::json!({ "balance": "40.00" }),
        )));
        let client = client(transport.clone(), CredentialPair::new("a1", "r1"));

        #[derive(serde::Deserialize)]
        struct Wallet {
            balance: String,
        }
        let wallet: Wallet = client.get_json("/api/wallet/me/").await.unwrap();

        assert_eq!(wallet.balance, "40.00");
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].authorization().as_deref(), Some("Bearer a1"));
        assert!(!sent[0].retry_attempted);
    }

    #[tokio::test]
    async fn test_server_error_never_renews() {
        let transport = Arc::new(FakeTransport::always(ApiResponse::new(
            500,
            serde_json::json!({ "detail": "boom" }),
        )));
        let client = client(transport.clone(), CredentialPair::new("a1", "r1"));

        let error = client
            .execute(OutboundRequest::get("/api/expenses/me/"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(500));
        assert_eq!(transport.count("/api/auth/refresh/"), 0);
    }

    #[tokio::test]
    async fn test_transport_error_never_renews() {
        let transport = Arc::new(FakeTransport::new(|_| async { Err(TransportError::Timeout) }));
        let client = client(transport.clone(), CredentialPair::new("a1", "r1"));

        let error = client
            .execute(OutboundRequest::get("/api/expenses/me/"))
            .await
            .unwrap_err();

        assert!(matches!(error, ClientError::Transport(TransportError::Timeout)));
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_request_goes_out_unmodified() {
        let transport = Arc::new(FakeTransport::always(ApiResponse::ok(serde_json::Value::Null)));
        let client = client(transport.clone(), CredentialPair::default());

        client.delete("/api/budgeting/bills/4/").await.unwrap();

        assert!(transport.sent()[0].bearer.is_none());
    }
}
