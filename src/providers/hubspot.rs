use async_trait::async_trait;

use super::traits::{OAuthProvider, ProviderError, TokenSet};

/// Consent page users land on from `/install`.
const AUTHORIZE_URL: &str = "https://app.hubspot.com/oauth/authorize";

const API_BASE_URL: &str = "https://api.hubapi.com";

/// HubSpot OAuth 2.0 provider.
///
/// Token lifetime: 30 minutes. Refresh: supported; HubSpot usually keeps
/// the original refresh token instead of rotating it, and both grants want
/// the redirect URI in the payload.
pub struct HubSpotProvider {
    client_id: String,
    client_secret: String,
    api_base: String,
    http: reqwest::Client,
}

impl HubSpotProvider {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_api_base(client_id, client_secret, API_BASE_URL.into())
    }

    /// Point the provider at a different API host (tests).
    pub fn with_api_base(client_id: String, client_secret: String, api_base: String) -> Self {
        Self {
            client_id,
            client_secret,
            api_base,
            http: reqwest::Client::new(),
        }
    }

    async fn token_grant(&self, form: &[(&str, &str)]) -> Result<TokenSet, ProviderError> {
        let resp = self
            .http
            .post(format!("{}/oauth/v1/token", self.api_base))
            .form(form)
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("token endpoint request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(serde_json::from_str(&body).unwrap_or_else(|_| {
                ProviderError::new(format!("token endpoint returned {status}"))
            }));
        }

        resp.json()
            .await
            .map_err(|e| ProviderError::new(format!("failed to parse token response: {e}")))
    }
}

#[async_trait]
impl OAuthProvider for HubSpotProvider {
    fn auth_url(&self, scopes: &[String], redirect_uri: &str) -> String {
        let scope = scopes.join(" ");
        format!(
            "{AUTHORIZE_URL}?client_id={client_id}&scope={scope}&redirect_uri={redirect_uri}",
            client_id = urlencoding(&self.client_id),
            scope = urlencoding(&scope),
            redirect_uri = urlencoding(redirect_uri),
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, ProviderError> {
        self.token_grant(&[
            ("grant_type", "authorization_code"),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ])
        .await
    }

    async fn refresh_token(
        &self,
        refresh_token: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, ProviderError> {
        self.token_grant(&[
            ("grant_type", "refresh_token"),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", redirect_uri),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}

/// Percent-encoding for authorization URL parameters. Spaces must come out
/// as `%20`, not `+`, to match what the app configuration expects.
fn urlencoding(s: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(s.as_bytes()).collect();
    encoded.replace('+', "%20")
}
