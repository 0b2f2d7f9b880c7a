use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crm_oauth_quickstart::auth::SessionSigner;
use crm_oauth_quickstart::crm::CrmClient;
use crm_oauth_quickstart::providers::{HubSpotProvider, OAuthProvider};
use crm_oauth_quickstart::store::{self, TokenStore};
use crm_oauth_quickstart::{api, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_oauth_quickstart=info".into()),
        )
        .init();

    // Credentials are checked here, before any socket is bound.
    let config = Config::from_env()?;
    info!("crm-oauth-quickstart v{}", env!("CARGO_PKG_VERSION"));
    info!("Scopes: {}", config.scopes.join(" "));
    info!("Redirect URI: {}", config.redirect_uri());

    let provider: Arc<dyn OAuthProvider> = Arc::new(HubSpotProvider::new(
        config.client_id.clone(),
        config.client_secret.clone(),
    ));

    let state: SharedState = Arc::new(AppState {
        store: TokenStore::new(),
        signer: SessionSigner::generate(),
        provider,
        crm: CrmClient::new(),
        config,
    });

    // Evict expired access tokens in the background
    let sweeper_state = state.clone();
    tokio::spawn(async move {
        store::sweep_daemon(sweeper_state).await;
    });

    let app = api::router(state.clone());

    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
