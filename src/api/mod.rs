//! HTTP front end for the quickstart.
//!
//! - `/`              — home page (install prompt or the sample contact)
//! - `/install`       — redirect to the provider's authorization URL
//! - `/oauth-callback` — authorization-code exchange
//! - `/error`         — display a failure message

pub mod pages;
pub mod routes;

use crate::SharedState;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}
