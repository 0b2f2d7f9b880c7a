use crate::providers::ProviderError;

/// Unified error type for the quickstart server.
///
/// Provider-facing failures travel as data (`ProviderError`) and are
/// branched on by the handlers; they never propagate as faults past a
/// request handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No refresh token on record for the session. Refreshing without one
    /// cannot succeed, so the caller is told to restart the install flow.
    #[error("session is not authorized; reinstall the app to continue")]
    Unauthorized,

    #[error("{0}")]
    Provider(#[from] ProviderError),
}
