//! Demand-driven access-token retrieval with transparent refresh.

use std::time::Duration;
use tracing::info;

use crate::error::AppError;
use crate::providers::{OAuthProvider, TokenSet};
use crate::store::TokenStore;

/// How long an access token is cached for, as a fraction of the lifetime
/// the provider declared: renewal happens before the provider actually
/// invalidates it.
pub fn access_ttl(expires_in: u64) -> Duration {
    Duration::from_secs(expires_in * 3 / 4)
}

/// Persist a token set for a session.
///
/// The refresh token is only overwritten when the provider sent one; a
/// refresh-token grant may omit it, keeping the original valid.
pub fn store_token_set(store: &TokenStore, session_id: &str, tokens: &TokenSet) {
    if let Some(refresh_token) = &tokens.refresh_token {
        store.set_refresh_token(session_id, refresh_token);
    }
    store.set_access_token(session_id, &tokens.access_token, access_ttl(tokens.expires_in));
}

/// Return a live access token for the session, going through a
/// refresh-token grant when the cached one is absent or expired.
///
/// Sessions that never completed the install flow fail with
/// [`AppError::Unauthorized`] before any network call is made.
pub async fn get_valid_access_token(
    store: &TokenStore,
    provider: &dyn OAuthProvider,
    redirect_uri: &str,
    session_id: &str,
) -> Result<String, AppError> {
    if let Some(token) = store.get_access_token(session_id) {
        return Ok(token);
    }

    let Some(refresh_token) = store.get_refresh_token(session_id) else {
        return Err(AppError::Unauthorized);
    };

    info!("Refreshing expired access token");
    let tokens = provider.refresh_token(&refresh_token, redirect_uri).await?;
    store_token_set(store, session_id, &tokens);

    Ok(tokens.access_token)
}
