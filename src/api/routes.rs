//! Route handlers for the OAuth 2.0 quickstart flow.
//!
//! Three routes drive an implicit two-state machine per session
//! (Unauthorized / Authorized, keyed on the refresh token being on
//! record), plus an error page that only echoes a message.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::access::{get_valid_access_token, store_token_set};
use crate::auth::session::{with_session_cookie, Session};
use crate::SharedState;

use super::pages;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/install", get(install))
        .route("/oauth-callback", get(oauth_callback))
        .route("/error", get(show_error))
        .with_state(state)
}

/// 302 with a Location header. `res.redirect` semantics; axum's `Redirect`
/// helpers only emit 303/307/308.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// GET /install — send the browser to the provider's authorization URL.
/// The session stays Unauthorized until the callback completes.
async fn install(State(state): State<SharedState>, session: Session) -> Response {
    let auth_url = state
        .provider
        .auth_url(&state.config.scopes, &state.config.redirect_uri());
    info!("Starting the OAuth 2.0 flow: redirecting to the authorization URL");
    with_session_cookie(found(&auth_url), &session, &state.signer)
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: String,
}

/// GET /oauth-callback — exchange the authorization code delivered by the
/// provider redirect, then hand the browser back to the home page. On a
/// rejected exchange the session stays Unauthorized and the browser goes
/// to `/error` with the provider's message.
async fn oauth_callback(
    State(state): State<SharedState>,
    session: Session,
    Query(q): Query<CallbackQuery>,
) -> Response {
    info!("Received an authorization code; exchanging it for tokens");

    let redirect_uri = state.config.redirect_uri();
    let response = match state.provider.exchange_code(&q.code, &redirect_uri).await {
        Ok(tokens) => {
            store_token_set(&state.store, &session.id, &tokens);
            info!("Received an access token and refresh token");
            found("/")
        }
        Err(e) => {
            warn!("Authorization code exchange failed: {e}");
            found(&format!("/error?msg={}", urlencoding(&e.message)))
        }
    };
    with_session_cookie(response, &session, &state.signer)
}

/// GET / — install prompt for Unauthorized sessions; for Authorized ones,
/// the sample contact fetched with a live access token, or the failure
/// message rendered in its place.
async fn home(State(state): State<SharedState>, session: Session) -> Response {
    if !state.store.is_authorized(&session.id) {
        let page = pages::install_prompt();
        return with_session_cookie(Html(page).into_response(), &session, &state.signer);
    }

    let redirect_uri = state.config.redirect_uri();
    let contact = match get_valid_access_token(
        &state.store,
        state.provider.as_ref(),
        &redirect_uri,
        &session.id,
    )
    .await
    {
        Ok(token) => state
            .crm
            .fetch_sample_record(&token)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    if let Err(message) = &contact {
        warn!("Could not fetch the sample contact: {message}");
    }

    let page = pages::authorized_home(&contact);
    with_session_cookie(Html(page).into_response(), &session, &state.signer)
}

#[derive(Deserialize)]
struct ErrorQuery {
    #[serde(default)]
    msg: String,
}

/// GET /error — pure display of a message passed via query parameter.
async fn show_error(Query(q): Query<ErrorQuery>) -> Html<String> {
    Html(pages::error_page(&q.msg))
}

/// Percent-encoding for redirect query parameters.
fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionSigner;
    use crate::crm::CrmClient;
    use crate::providers::HubSpotProvider;
    use crate::store::TokenStore;
    use crate::{AppState, Config};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(api_base: String) -> SharedState {
        Arc::new(AppState {
            config: Config {
                port: 4000,
                domain: None,
                client_id: "client-id".into(),
                client_secret: "client-secret".into(),
                scopes: vec!["crm.objects.contacts.read".into()],
            },
            store: TokenStore::new(),
            signer: SessionSigner::generate(),
            provider: Arc::new(HubSpotProvider::with_api_base(
                "client-id".into(),
                "client-secret".into(),
                api_base.clone(),
            )),
            crm: CrmClient::with_api_base(api_base),
        })
    }

    fn session_cookie(state: &SharedState, session_id: &str) -> String {
        format!("sid={}", state.signer.sign(session_id))
    }

    async fn get(state: &SharedState, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        crate::api::router(state.clone())
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_unauthorized_home_renders_install_prompt_without_network() {
        let server = MockServer::start().await;
        let state = test_state(server.uri());

        let response = get(&state, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("href=\"/install\""));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_session_gets_a_signed_cookie() {
        let server = MockServer::start().await;
        let state = test_state(server.uri());

        let response = get(&state, "/", None).await;
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(set_cookie.starts_with("sid="));
        assert!(set_cookie.contains("HttpOnly"));

        // A request presenting that cookie keeps the same session and is
        // not handed a new one.
        let cookie = set_cookie.split(';').next().unwrap().to_string();
        let response = get(&state, "/", Some(&cookie)).await;
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_install_redirects_to_the_authorization_url() {
        let server = MockServer::start().await;
        let state = test_state(server.uri());

        let response = get(&state, "/install", None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://app.hubspot.com/oauth/authorize\
             ?client_id=client-id\
             &scope=crm.objects.contacts.read\
             &redirect_uri=https%3A%2F%2Flocalhost%3A4000%2Foauth-callback"
        );
    }

    #[tokio::test]
    async fn test_callback_success_authorizes_the_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "AT1",
                "refresh_token": "RT1",
                "expires_in": 1800,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = test_state(server.uri());
        let cookie = session_cookie(&state, "sess1");

        let response = get(&state, "/oauth-callback?code=abc123", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/");

        assert!(state.store.is_authorized("sess1"));
        assert_eq!(state.store.get_refresh_token("sess1").as_deref(), Some("RT1"));
        assert_eq!(state.store.get_access_token("sess1").as_deref(), Some("AT1"));
    }

    #[tokio::test]
    async fn test_callback_failure_redirects_to_error_and_stays_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "error",
                "message": "invalid_grant",
            })))
            .mount(&server)
            .await;

        let state = test_state(server.uri());
        let cookie = session_cookie(&state, "sess1");

        let response = get(&state, "/oauth-callback?code=expired", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/error?msg=invalid_grant");
        assert!(!state.store.is_authorized("sess1"));
    }

    #[tokio::test]
    async fn test_exchange_then_home_reuses_the_cached_token() {
        let server = MockServer::start().await;
        // expect(1): the home request must be served from the cache, not a
        // second token grant.
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "AT1",
                "refresh_token": "RT1",
                "expires_in": 1800,
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contacts/v1/lists/all/contacts/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "contacts": [
                    {
                        "properties": {
                            "firstname": { "value": "Brian" },
                            "lastname": { "value": "Halligan" },
                        }
                    },
                ]
            })))
            .mount(&server)
            .await;

        let state = test_state(server.uri());
        let cookie = session_cookie(&state, "sess1");

        let response = get(&state, "/oauth-callback?code=abc123", Some(&cookie)).await;
        assert_eq!(location(&response), "/");

        let response = get(&state, "/", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Brian Halligan"));
    }

    #[tokio::test]
    async fn test_home_renders_refresh_failure_inline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "error",
                "message": "refresh token was revoked",
            })))
            .mount(&server)
            .await;

        let state = test_state(server.uri());
        state.store.set_refresh_token("sess1", "RT1");
        let cookie = session_cookie(&state, "sess1");

        let response = get(&state, "/", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("refresh token was revoked"));
        assert!(body.contains("Unable to retrieve a contact"));
    }

    #[tokio::test]
    async fn test_error_route_escapes_the_message() {
        let server = MockServer::start().await;
        let state = test_state(server.uri());

        let response = get(&state, "/error?msg=%3Cb%3Einvalid_grant%3C%2Fb%3E", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Error: &lt;b&gt;invalid_grant&lt;/b&gt;"));
    }
}
