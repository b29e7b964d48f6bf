use std::sync::Arc;

use askama::Template;
use axum::{
    Extension, Form,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};

use super::{
    dashboard::{IdInput, delete_application},
    drop_if_rejected, open_session, to_login,
};
use crate::{
    pkg::server::{middlewares::authn::Credentials, state::AppState, uispec::Profile},
    prelude::Result,
};

pub async fn load(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
) -> Result<Response> {
    let profile = match state.backend.profile(creds.token()).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("profile load failed, sending to login: {:?}", e);
            drop_if_rejected(&state, &creds, &e);
            return Ok(to_login(&state).into_response());
        }
    };
    let template = Profile {
        service_name: &state.service_name,
        email: &profile.email,
        applications_count: profile.applications_count,
        notice: open_session(&state, &creds).take_notice(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    headers: HeaderMap,
    Form(input): Form<IdInput>,
) -> Response {
    delete_application(&state, &creds, &headers, &input.id, "/profile").await
}
