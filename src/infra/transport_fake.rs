use crate::domain_model::*;
use crate::domain_port::*;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

type Handler = Arc<
    dyn Fn(OutboundRequest) -> BoxFuture<'static, Result<ApiResponse, TransportError>>
        + Send
        + Sync,
>;

/// In-process transport for tests and demos. Every request is recorded at
/// the moment it is issued, then answered by the supplied handler.
pub struct FakeTransport {
    handler: Handler,
    sent: Mutex<Vec<OutboundRequest>>,
}

impl FakeTransport {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(OutboundRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ApiResponse, TransportError>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |request| Box::pin(handler(request))),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with a clone of `response`.
    pub fn always(response: ApiResponse) -> Self {
        Self::new(move |_| {
            let response = response.clone();
            async move { Ok(response) }
        })
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, route: &str) -> Vec<OutboundRequest> {
        self.sent
            .lock()
            .iter()
            .filter(|request| request.targets(route))
            .cloned()
            .collect()
    }

    pub fn count(&self, route: &str) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|request| request.targets(route))
            .count()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<ApiResponse, TransportError> {
        self.sent.lock().push(request.clone());
        (self.handler)(request.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_issue_order() {
        let transport = FakeTransport::always(ApiResponse::ok(serde_json::Value::Null));
        transport.send(&OutboundRequest::get("/a/")).await.unwrap();
        transport.send(&OutboundRequest::get("/b/?x=1")).await.unwrap();
        transport.send(&OutboundRequest::get("/a/")).await.unwrap();

        let paths: Vec<_> = transport.sent().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/a/", "/b/?x=1", "/a/"]);
        assert_eq!(transport.count("/a/"), 2);
        assert_eq!(transport.sent_to("/b/").len(), 1);
    }
}
