use super::session_client::send_once;
use crate::application_impl::{RequestInterceptor, SessionEvents};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use futures_util::future::join_all;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

pub const DEFAULT_RENEWAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RenewalConfig {
    pub refresh_path: String,
    pub timeout: Duration,
}

impl RenewalConfig {
    pub fn new(refresh_path: impl Into<String>) -> Self {
        Self {
            refresh_path: refresh_path.into(),
            timeout: DEFAULT_RENEWAL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

type Reply = oneshot::Sender<Result<ApiResponse, ClientError>>;
type Pending = oneshot::Receiver<Result<ApiResponse, ClientError>>;

/// A request parked until the in-flight renewal settles.
struct Waiter {
    request: OutboundRequest,
    error: ClientError,
    reply: Reply,
}

#[derive(Default)]
struct RenewalState {
    renewing: bool,
    waiters: VecDeque<Waiter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalSnapshot {
    pub renewing: bool,
    pub waiting: usize,
}

enum Step {
    End(ClientError),
    Wait(Pending),
    Replay(OutboundRequest, Token),
    Lead(OutboundRequest, Token),
}

/// Failure stage of the client pipeline.
///
/// Guarantees at most one renewal exchange in flight: the `renewing` flag
/// is checked and set under one lock with no suspension in between, and
/// every unauthorized request observed while it is set joins the FIFO
/// waiter queue instead of starting its own exchange.
#[derive(Clone)]
pub struct RenewalCoordinator {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    interceptor: RequestInterceptor,
    events: Arc<SessionEvents>,
    config: Arc<RenewalConfig>,
    state: Arc<Mutex<RenewalState>>,
}

impl RenewalCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        interceptor: RequestInterceptor,
        events: Arc<SessionEvents>,
        config: RenewalConfig,
    ) -> Self {
        Self {
            transport,
            credentials,
            interceptor,
            events,
            config: Arc::new(config),
            state: Arc::new(Mutex::new(RenewalState::default())),
        }
    }

    pub fn snapshot(&self) -> RenewalSnapshot {
        let state = self.state.lock();
        RenewalSnapshot {
            renewing: state.renewing,
            waiting: state.waiters.len(),
        }
    }

    /// Handles a request that came back unauthorized. The caller sees
    /// either the replayed response or a terminal error, never the
    /// renewal itself.
    pub async fn recover(
        &self,
        mut request: OutboundRequest,
        mut error: ClientError,
    ) -> Result<ApiResponse, ClientError> {
        if request.retry_attempted {
            tracing::debug!(method = %request.method, path = %request.path, "already replayed once; giving up");
            return Err(error);
        }

        if request.targets(&self.config.refresh_path) {
            tracing::warn!(path = %request.path, "renewal endpoint rejected the session");
            self.end_session();
            return Err(error);
        }

        request.retry_attempted = true;
        let mut stale_replayed = false;

        loop {
            // Store reads happen under the state lock: a failed cycle clears
            // the store before it settles.
            let step = {
                let mut state = self.state.lock();
                match self.credentials.refresh() {
                    None => Step::End(error),
                    Some(_) if state.renewing => {
                        let (reply, pending) = oneshot::channel();
                        state.waiters.push_back(Waiter {
                            request,
                            error,
                            reply,
                        });
                        Step::Wait(pending)
                    }
                    Some(refresh) => match self.credentials.access() {
                        // Renewed while this request was on the wire.
                        Some(current)
                            if !stale_replayed && request.bearer.as_ref() != Some(&current) =>
                        {
                            Step::Replay(request, current)
                        }
                        _ => {
                            state.renewing = true;
                            Step::Lead(request, refresh)
                        }
                    },
                }
            };

            match step {
                Step::End(error) => {
                    tracing::info!("unauthorized without refresh credential");
                    self.end_session();
                    return Err(error);
                }
                Step::Wait(pending) => {
                    tracing::debug!("renewal in flight; request queued");
                    return pending.await.unwrap_or(Err(ClientError::Abandoned));
                }
                Step::Replay(mut stale, token) => {
                    tracing::debug!(path = %stale.path, "credential already renewed; replaying");
                    stale_replayed = true;
                    self.interceptor.attach_token(&mut stale, &token);
                    match send_once(self.transport.as_ref(), &stale).await {
                        Err(rejected @ ClientError::Unauthorized { .. }) => {
                            tracing::debug!(path = %stale.path, "current credential rejected too; renewing");
                            request = stale;
                            error = rejected;
                        }
                        result => return result,
                    }
                }
                Step::Lead(request, refresh) => {
                    let (reply, pending) = oneshot::channel();
                    // Detached so a dropped caller cannot leave `renewing` set.
                    let coordinator = self.clone();
                    tokio::spawn(async move { coordinator.run_cycle(request, refresh, reply).await });
                    return pending.await.unwrap_or(Err(ClientError::Abandoned));
                }
            }
        }
    }

    async fn run_cycle(self, request: OutboundRequest, refresh: Token, reply: Reply) {
        tracing::info!(method = %request.method, path = %request.path, "access credential rejected; renewing");

        match self.renew(&refresh).await {
            Ok(renewed) => {
                let access = renewed.access.clone();
                self.credentials.set(renewed.into());
                let waiters = self.settle();
                tracing::info!(replays = waiters.len() + 1, "renewal succeeded");

                let mut batch = Vec::with_capacity(waiters.len() + 1);
                batch.push((request, reply));
                batch.extend(waiters.into_iter().map(|w| (w.request, w.reply)));

                let this = &self;
                let access = &access;
                join_all(batch.into_iter().map(|(request, reply)| async move {
                    let result = this.replay(request, access).await;
                    let _ = reply.send(result);
                }))
                .await;
            }
            Err(cause) => {
                tracing::warn!(error = %cause, "renewal failed; ending session");
                self.credentials.clear();
                let waiters = self.settle();
                for waiter in waiters {
                    let _ = waiter.reply.send(Err(waiter.error));
                }
                self.events.notify();
                let _ = reply.send(Err(ClientError::RenewalFailed(cause)));
            }
        }
    }

    async fn renew(&self, refresh: &Token) -> Result<RenewedCredentials, RenewalError> {
        let request = OutboundRequest::post(self.config.refresh_path.as_str())
            .with_json(&RenewalBody { refresh })
            .map_err(|e| RenewalError::Malformed(e.to_string()))?;

        let response = tokio::time::timeout(self.config.timeout, self.transport.send(&request))
            .await
            .map_err(|_| RenewalError::TimedOut(self.config.timeout))??;

        if !response.is_success() {
            return Err(RenewalError::Rejected {
                status: response.status,
            });
        }
        response
            .json::<RenewedCredentials>()
            .map_err(|e| RenewalError::Malformed(e.to_string()))
    }

    /// Closes the cycle: clears the flag and takes the queue in one step.
    fn settle(&self) -> VecDeque<Waiter> {
        let mut state = self.state.lock();
        state.renewing = false;
        std::mem::take(&mut state.waiters)
    }

    async fn replay(
        &self,
        mut request: OutboundRequest,
        token: &Token,
    ) -> Result<ApiResponse, ClientError> {
        self.interceptor.attach_token(&mut request, token);
        let result = send_once(self.transport.as_ref(), &request).await;
        if let Err(ClientError::Unauthorized { .. }) = &result {
            tracing::warn!(method = %request.method, path = %request.path, "rejected again after renewal");
        }
        result
    }

    fn end_session(&self) {
        self.credentials.clear();
        self.events.notify();
    }
}
