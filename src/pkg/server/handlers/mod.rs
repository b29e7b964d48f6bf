pub mod auth;
pub mod dashboard;
pub mod postings;
pub mod probes;
pub mod profile;
pub mod ui;

use std::sync::Arc;

use axum::{
    Json,
    http::{
        HeaderMap, StatusCode,
        header::{ACCEPT, REFERER},
    },
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Url;
use serde::Serialize;
use standard_error::StandardError;

use super::{middlewares::authn::Credentials, state::AppState};
use crate::pkg::internal::session::{Notice, SessionState};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ActionResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

impl ActionResult {
    pub fn success(message: &str) -> Self {
        ActionResult {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn error(message: &str) -> Self {
        ActionResult {
            kind: "error",
            message: message.into(),
        }
    }

    fn is_success(&self) -> bool {
        self.kind == "success"
    }
}

// fetch and htmx callers read the JSON; a plain form post gets sent back
pub(super) fn wants_json(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
        || headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"))
}

pub(super) fn back_path(referer: &str) -> Option<String> {
    let url = Url::parse(referer).ok()?;
    Some(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

/// Path and query of the page that posted, or `fallback`.
pub(super) fn back_to(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(back_path)
        .unwrap_or_else(|| fallback.into())
}

pub(super) fn respond(
    headers: &HeaderMap,
    session: Option<Arc<SessionState>>,
    fallback: &str,
    result: ActionResult,
) -> Response {
    if wants_json(headers) {
        return Json(result).into_response();
    }
    if let Some(session) = session {
        session.notice.set(Some(Notice {
            ok: result.is_success(),
            message: result.message,
        }));
    }
    Redirect::to(&back_to(headers, fallback)).into_response()
}

/// Session of a token the backend already accepted, if any.
pub(super) fn known_session(state: &AppState, creds: &Credentials) -> Option<Arc<SessionState>> {
    creds.token().and_then(|token| state.sessions.get(token))
}

/// Opens the session once a backend call with the token has succeeded.
/// Visitors without a token get a throwaway one.
pub(super) fn open_session(state: &AppState, creds: &Credentials) -> Arc<SessionState> {
    match creds.token() {
        Some(token) => state.sessions.open(token),
        None => Arc::new(SessionState::default()),
    }
}

pub(super) fn drop_if_rejected(state: &AppState, creds: &Credentials, err: &StandardError) {
    let rejected = matches!(
        err.status_code,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    );
    if !rejected {
        return;
    }
    if let Some(token) = creds.token() {
        tracing::info!("backend rejected the auth token, dropping its ui session");
        state.sessions.forget(token);
    }
}

pub(super) fn to_login(state: &AppState) -> Redirect {
    Redirect::to(&state.backend.login_url())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_back_path() {
        assert_eq!(
            back_path("http://localhost:3000/postings?q=go&page=2").as_deref(),
            Some("/postings?q=go&page=2")
        );
        assert_eq!(back_path("https://x.test/dashboard").as_deref(), Some("/dashboard"));
        assert_eq!(back_path("not a url"), None);
    }

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        assert!(!wants_json(&headers));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert!(wants_json(&headers));
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(wants_json(&headers));
    }
}
