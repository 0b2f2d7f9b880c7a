pub mod api;
pub mod auth;
pub mod config;
pub mod crm;
pub mod error;
pub mod providers;
pub mod store;

pub use config::Config;
pub use error::AppError;

use std::sync::Arc;

use auth::SessionSigner;
use crm::CrmClient;
use providers::OAuthProvider;
use store::TokenStore;

/// Shared application state passed to all handlers.
///
/// Owns the token maps for the life of the process; swapping the store for
/// a persistent backing implementation would not touch any call site.
pub struct AppState {
    pub config: Config,
    pub store: TokenStore,
    pub signer: SessionSigner,
    pub provider: Arc<dyn OAuthProvider>,
    pub crm: CrmClient,
}

pub type SharedState = Arc<AppState>;
