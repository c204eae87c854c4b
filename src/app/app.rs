use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;

/// The session layer wired from settings. One instance per process; tests
/// build as many independent ones as they need.
pub struct App {
    pub client: SessionClient,
    pub auth_service: Arc<dyn AuthService>,
    pub session_events: Arc<SessionEvents>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl App {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let credentials: Arc<dyn CredentialStore> = match settings.credentials.backend.as_str() {
            "memory" => Arc::new(MemoryCredentialStore::new()),
            "file" => Arc::new(FileCredentialStore::open(&settings.credentials.path)),
            other => anyhow::bail!("unknown credentials backend: {other:?}"),
        };

        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::try_new(
            &settings.api.base_url,
            settings.api.request_timeout(),
        )?);

        info!(
            base_url = %settings.api.base_url,
            credentials = %settings.credentials.backend,
            "session layer configured"
        );

        let paths = AuthPaths {
            login: settings.api.login_path.clone(),
            me: settings.api.me_path.clone(),
        };
        let renewal = RenewalConfig::new(settings.api.refresh_path.clone())
            .with_timeout(settings.api.renewal_timeout());

        Ok(Self::assemble(transport, credentials, renewal, paths))
    }

    /// Wires the components around an arbitrary transport and store.
    pub fn assemble(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        renewal: RenewalConfig,
        paths: AuthPaths,
    ) -> Self {
        let session_events = Arc::new(SessionEvents::new());
        let client = SessionClient::new(
            transport.clone(),
            credentials.clone(),
            session_events.clone(),
            renewal,
        );
        let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            client.clone(),
            transport,
            credentials.clone(),
            paths,
        ));

        // Session loss drops the cached identity; callers decide where to go next.
        let identity = Arc::downgrade(&auth_service);
        session_events.register(move || {
            if let Some(auth_service) = identity.upgrade() {
                auth_service.forget_identity();
            }
            warn!("session expired; sign in again");
        });

        Self {
            client,
            auth_service,
            session_events,
            credentials,
        }
    }
}
