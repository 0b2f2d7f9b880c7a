//! Background eviction of expired access-token entries.
//!
//! Reads already enforce the deadline; the sweeper just keeps the map from
//! accumulating dead entries between requests.

use std::sync::Arc;
use tracing::{debug, info};

/// Start the eviction loop.
pub async fn sweep_daemon(state: Arc<crate::AppState>) {
    let interval = tokio::time::Duration::from_secs(60);
    info!("Access token sweeper started (interval: 60s)");

    loop {
        tokio::time::sleep(interval).await;
        let evicted = state.store.purge_expired();
        if evicted > 0 {
            debug!("Evicted {evicted} expired access token(s)");
        }
    }
}
