use async_trait::async_trait;
use serde::Deserialize;

/// Tokens returned from the provider after a code exchange or refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    /// Absent when the provider chooses not to rotate the refresh token on
    /// a refresh-token grant; the stored one stays valid in that case.
    pub refresh_token: Option<String>,
    /// Declared access-token lifetime in seconds.
    pub expires_in: u64,
}

/// Parsed provider error body.
///
/// Exchange and API failures are expected here (expired codes, revoked
/// tokens), so they travel as values the caller can branch on and render.
#[derive(Debug, Clone, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    #[serde(default)]
    pub status: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Trait an OAuth provider must implement: the authorization URL plus the
/// two token grants.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Build the authorization URL the user is redirected to when they
    /// choose to install the app.
    fn auth_url(&self, scopes: &[String], redirect_uri: &str) -> String;

    /// Exchange a one-time authorization code for a token set.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, ProviderError>;

    /// Obtain a fresh access token from a refresh token.
    async fn refresh_token(
        &self,
        refresh_token: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, ProviderError>;
}
