use futures_util::future::join_all;
use parking_lot::Mutex;
use pocketbook::app::App;
use pocketbook::application_impl::*;
use pocketbook::domain_model::*;
use pocketbook::infra::*;
use pocketbook::logger::*;
use std::sync::Arc;
use std::time::Duration;

// Simulated API: one valid access token at a time, rotated by the refresh endpoint.
fn fake_api(valid: Arc<Mutex<String>>) -> FakeTransport {
    FakeTransport::new(move |request: OutboundRequest| {
        let valid = valid.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let current = valid.lock().clone();
            let response = match request.route() {
                "/api/auth/login/" => {
                    ApiResponse::ok(serde_json::json!({ "access": current, "refresh": "r1" }))
                }
                "/api/auth/refresh/" => {
                    let next = format!("{current}'");
                    *valid.lock() = next.clone();
                    ApiResponse::ok(serde_json::json!({ "access": next }))
                }
                _ if request.authorization() == Some(format!("Bearer {current}")) => {
                    ApiResponse::ok(serde_json::json!({
                        "id": 1, "username": "demo", "role": "PARENT", "path": request.path.clone()
                    }))
                }
                _ => ApiResponse::unauthorized(),
            };
            Ok(response)
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    logger.reload_from_config(&LogConfig {
        filter: "debug".to_string(),
    })?;

    let valid = Arc::new(Mutex::new("a1".to_string()));
    let transport = Arc::new(fake_api(valid.clone()));
    let app = App::assemble(
        transport.clone(),
        Arc::new(MemoryCredentialStore::new()),
        RenewalConfig::new("/api/auth/refresh/"),
        AuthPaths {
            login: "/api/auth/login/".into(),
            me: "/api/auth/me/".into(),
        },
    );

    let user = app
        .auth_service
        .login(LoginInput {
            username: "demo".into(),
            password: "demo".into(),
        })
        .await?;
    info!(?user, "signed in");

    // Expire the access token server-side, then fire a burst of requests.
    *valid.lock() = "a2".to_string();
    let paths = [
        "/api/wallet/me/",
        "/api/budgeting/plans/active/",
        "/api/expenses/me/summary/",
        "/api/relationships/invites/me/",
    ];
    let results = join_all(
        paths
            .iter()
            .map(|path| app.client.execute(OutboundRequest::get(*path))),
    )
    .await;

    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(response) => info!(path, status = response.status, "replayed"),
            Err(e) => error!(path, error = %e, "failed"),
        }
    }
    info!(
        renewals = transport.count("/api/auth/refresh/"),
        "burst finished"
    );

    // Lose the refresh side too: the next failure ends the session once.
    app.credentials.set(CredentialPair {
        access: Some(Token::new("bogus")),
        refresh: None,
    });
    let result = app.client.execute(OutboundRequest::get("/api/wallet/me/")).await;
    info!(
        ok = result.is_ok(),
        signed_in = app.auth_service.cached_user().is_some(),
        "after session loss"
    );

    Ok(())
}
