use std::sync::Arc;

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use axum_extra::extract::CookieJar;

pub const AUTH_COOKIE: &str = "authToken";

/// The backend-issued token the browser presented, if any. We only relay it;
/// the backend decides whether it is any good.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub token: Option<String>,
}

impl Credentials {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

pub async fn relay_token(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(&headers);
    let token = jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());
    if token.is_none() {
        tracing::debug!("no auth token on {}", request.uri().path());
    }
    request.extensions_mut().insert(Arc::new(Credentials { token }));
    next.run(request).await
}
