use anyhow::{Context, Result};

/// Scope requested when SCOPE is not set.
const DEFAULT_SCOPE: &str = "crm.objects.contacts.read";

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Public hostname used to build the OAuth redirect URI. When unset the
    /// redirect URI points at localhost with the chosen port.
    pub domain: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "4000".into())
                .parse()
                .context("Invalid PORT")?,
            domain: std::env::var("DOMAIN").ok(),
            client_id: std::env::var("CLIENT_ID")
                .context("CLIENT_ID is required (client credentials from your app configuration)")?,
            client_secret: std::env::var("CLIENT_SECRET")
                .context("CLIENT_SECRET is required (client credentials from your app configuration)")?,
            scopes: std::env::var("SCOPE")
                .map(|raw| parse_scopes(&raw))
                .unwrap_or_else(|_| vec![DEFAULT_SCOPE.into()]),
        })
    }

    /// The OAuth callback URL registered with the provider. Must match the
    /// app configuration byte for byte or the provider rejects the flow.
    pub fn redirect_uri(&self) -> String {
        match &self.domain {
            Some(domain) => format!("https://{domain}/oauth-callback"),
            None => format!("https://localhost:{}/oauth-callback", self.port),
        }
    }
}

/// Split a SCOPE value on spaces, commas, or literal `%20` separators.
fn parse_scopes(raw: &str) -> Vec<String> {
    raw.replace("%20", " ")
        .split([' ', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
