use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::LOCATION, header::SET_COOKIE},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::{
    pkg::server::{
        middlewares::authn::{AUTH_COOKIE, Credentials},
        state::AppState,
    },
    prelude::Result,
};

const AUTH_MAX_AGE: u64 = 30 * 24 * 60 * 60;

#[derive(Deserialize)]
pub struct AuthComplete {
    pub token: Option<String>,
}

fn auth_cookie(value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        AUTH_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn found(location: &str, cookie: &str) -> Result<(StatusCode, HeaderMap)> {
    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, HeaderValue::from_str(location)?);
    headers.insert(SET_COOKIE, HeaderValue::from_str(cookie)?);
    Ok((StatusCode::FOUND, headers))
}

/// Where the backend sends the browser after Google sign-in.
pub async fn auth_complete(
    State(state): State<AppState>,
    Query(params): Query<AuthComplete>,
) -> Result<impl IntoResponse> {
    match params.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => {
            tracing::info!("sign-in completed");
            found(
                "/dashboard",
                &auth_cookie(token.trim(), AUTH_MAX_AGE, state.cookie_secure),
            )
        }
        None => {
            tracing::warn!("sign-in completed without a token");
            found("/", &auth_cookie("", 0, state.cookie_secure))
        }
    }
}

pub async fn logout_complete(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
) -> Result<impl IntoResponse> {
    if let Some(token) = creds.token() {
        state.sessions.forget(token);
    }
    tracing::info!("signed out, {} ui sessions open", state.sessions.len());
    found("/", &auth_cookie("", 0, state.cookie_secure))
}

pub async fn google_logout(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.backend.logout_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie() {
        assert_eq!(
            auth_cookie("tok", AUTH_MAX_AGE, true),
            "authToken=tok; Path=/; Max-Age=2592000; SameSite=Lax; Secure"
        );
        assert_eq!(
            auth_cookie("", 0, false),
            "authToken=; Path=/; Max-Age=0; SameSite=Lax"
        );
    }
}
