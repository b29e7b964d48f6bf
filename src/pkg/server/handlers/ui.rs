use std::sync::Arc;

use askama::Template;
use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Redirect},
};

use super::back_to;
use crate::{
    pkg::{
        internal::prefs::{CookiePreferences, ViewPreference},
        server::{middlewares::authn::Credentials, state::AppState, uispec::Home},
    },
    prelude::Result,
};

const COMPANY_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="#9ca3af" stroke-width="1.5"><rect x="4" y="3" width="16" height="18" rx="1"/><path d="M9 7h2M13 7h2M9 11h2M13 11h2M9 15h2M13 15h2M11 21v-3h2v3"/></svg>"##;

pub async fn home(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
) -> Result<Html<String>> {
    let login_url = state.backend.login_url();
    let template = Home {
        service_name: &state.service_name,
        login_url: &login_url,
        signed_in: creds.token().is_some(),
    };
    Ok(Html(template.render()?))
}

pub async fn toggle_view(headers: HeaderMap) -> Result<impl IntoResponse> {
    let prefs = Arc::new(CookiePreferences::from_headers(&headers));
    let grid = ViewPreference::load(prefs.clone()).toggle();
    tracing::debug!("grid view now {}", grid);
    let back = back_to(&headers, "/dashboard");
    Ok((prefs.set_cookie_headers()?, Redirect::to(&back)))
}

pub async fn company_logo() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/svg+xml")], COMPANY_SVG)
}
