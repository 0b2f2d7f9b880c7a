//! Browser session identity.
//!
//! Sessions are identified by a random id carried in an HMAC-signed `sid`
//! cookie. The signing key lives only in process memory, so every session
//! starts over Unauthorized after a restart, consistent with the
//! memory-only token store.

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::response::Response;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore};
use sha2::Sha256;
use std::convert::Infallible;

use crate::SharedState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "sid";

const SESSION_ID_LEN: usize = 32;

/// Signs and verifies session cookie values with a key generated at
/// process start.
pub struct SessionSigner {
    mac: HmacSha256,
}

impl SessionSigner {
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        // HMAC accepts keys of any length
        let mac = <HmacSha256 as Mac>::new_from_slice(&key).expect("HMAC key init");
        Self { mac }
    }

    /// Cookie value: `{id}.{base64url(hmac(id))}`.
    pub fn sign(&self, session_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(mac.finalize().into_bytes());
        format!("{session_id}.{signature}")
    }

    /// Extract the session id from a cookie value, rejecting anything with
    /// a missing or forged signature.
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (session_id, signature_b64) = cookie_value.split_once('.')?;
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature_b64)
            .ok()?;

        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(session_id.to_string())
    }
}

/// Per-request session identity. `fresh` marks ids minted on this request
/// that still need a Set-Cookie on the response.
pub struct Session {
    pub id: String,
    fresh: bool,
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let existing = parts
            .headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|cookies| find_cookie(cookies, SESSION_COOKIE))
            .and_then(|value| state.signer.verify(value));

        Ok(match existing {
            Some(id) => Session { id, fresh: false },
            None => Session {
                id: random_session_id(),
                fresh: true,
            },
        })
    }
}

/// Attach the signed session cookie to a response for newly minted
/// sessions.
pub fn with_session_cookie(
    mut response: Response,
    session: &Session,
    signer: &SessionSigner,
) -> Response {
    if session.fresh {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly",
            signer.sign(&session.id)
        );
        if let Ok(value) = cookie.parse() {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Locate a cookie value in a `Cookie:` header.
fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

fn random_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let signer = SessionSigner::generate();
        let signed = signer.sign("abc123");
        assert_eq!(signer.verify(&signed).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_tampered_cookie_is_rejected() {
        let signer = SessionSigner::generate();
        let signed = signer.sign("abc123");
        let tampered = signed.replacen("abc", "xyz", 1);
        assert!(signer.verify(&tampered).is_none());
        assert!(signer.verify("no-signature-here").is_none());
    }

    #[test]
    fn test_keys_differ_per_process_instance() {
        let a = SessionSigner::generate();
        let b = SessionSigner::generate();
        let signed = a.sign("abc123");
        assert!(b.verify(&signed).is_none());
    }

    #[test]
    fn test_find_cookie_picks_the_right_pair() {
        let header = "theme=dark; sid=abc.def; lang=en";
        assert_eq!(find_cookie(header, "sid"), Some("abc.def"));
        assert_eq!(find_cookie(header, "theme"), Some("dark"));
        assert!(find_cookie(header, "missing").is_none());
    }

    #[test]
    fn test_session_ids_are_random() {
        let a = random_session_id();
        let b = random_session_id();
        assert_eq!(a.len(), SESSION_ID_LEN);
        assert_ne!(a, b);
    }
}
