//! Minimal CRM API client: fetch one sample contact with a bearer token.

use serde::Deserialize;

use crate::providers::ProviderError;

const API_BASE_URL: &str = "https://api.hubapi.com";

/// Client for the contacts read used by the home page.
pub struct CrmClient {
    api_base: String,
    http: reqwest::Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub properties: ContactProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactProperties {
    pub firstname: Option<Property>,
    pub lastname: Option<Property>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct ContactsPage {
    contacts: Vec<Contact>,
}

impl Contact {
    /// "firstname lastname", tolerating contacts with unset name fields.
    pub fn display_name(&self) -> String {
        let first = self
            .properties
            .firstname
            .as_ref()
            .map_or("", |p| p.value.as_str());
        let last = self
            .properties
            .lastname
            .as_ref()
            .map_or("", |p| p.value.as_str());
        format!("{first} {last}").trim().to_string()
    }
}

impl CrmClient {
    pub fn new() -> Self {
        Self::with_api_base(API_BASE_URL.into())
    }

    /// Point the client at a different API host (tests).
    pub fn with_api_base(api_base: String) -> Self {
        Self {
            api_base,
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the first contact of the account.
    ///
    /// Failures come back as the parsed provider error body so the caller
    /// can render them in place of the record; this never panics.
    pub async fn fetch_sample_record(&self, access_token: &str) -> Result<Contact, ProviderError> {
        let resp = self
            .http
            .get(format!(
                "{}/contacts/v1/lists/all/contacts/all?count=1",
                self.api_base
            ))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("contacts request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(serde_json::from_str(&body).unwrap_or_else(|_| {
                ProviderError::new(format!("contacts endpoint returned {status}"))
            }));
        }

        let page: ContactsPage = resp
            .json()
            .await
            .map_err(|e| ProviderError::new(format!("failed to parse contacts response: {e}")))?;

        page.contacts
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new("the account has no contacts"))
    }
}
