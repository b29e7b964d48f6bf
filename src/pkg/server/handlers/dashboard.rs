use std::sync::Arc;

use askama::Template;
use axum::{
    Extension, Form, Json,
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use super::{
    ActionResult, drop_if_rejected, known_session, open_session, respond, to_login, wants_json,
};
use crate::{
    pkg::{
        internal::{
            backend::NewApplication,
            date,
            filter::{Filter, PageDescriptor, QueryParams, STATUSES, build_params},
            prefs::{CookiePreferences, ViewPreference},
            session::StatusUpdate,
        },
        server::{
            middlewares::authn::Credentials,
            state::AppState,
            uispec::{ApplicationCard, Dashboard, Pager, status_options},
        },
    },
    prelude::Result,
};

const NEW_STATUS: &str = "Applied";

#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(flatten)]
    pub filter: Filter,
    #[serde(default)]
    pub current: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddInput {
    #[validate(length(min = 1))]
    pub role: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[serde(default)]
    pub location: String,
    /// `YYYY-MM-DD`, today when missing
    #[serde(default)]
    pub applied_date: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Deserialize)]
pub struct IdInput {
    pub id: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditStatusInput {
    #[validate(length(min = 1))]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub prev_status: String,
}

#[derive(Deserialize)]
pub struct RevertInput {
    pub id: String,
    #[serde(rename = "operationID", default)]
    pub operation_id: String,
}

pub async fn load(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let current = query.unwrap_or_default();
    if current.is_empty() {
        let remembered = known_session(&state, &creds)
            .map(|session| session.dashboard_filter.get())
            .filter(|filter| *filter != Filter::dashboard());
        if let Some(remembered) = remembered {
            tracing::debug!("restoring dashboard filter");
            let target = format!("/dashboard?{}", build_params("", &remembered));
            return Ok(Redirect::to(&target).into_response());
        }
    }

    let params = QueryParams::parse(&current);
    let filter = Filter::from_query(&params);
    let res = match state.backend.dashboard(creds.token(), &params).await {
        Ok(res) => res,
        Err(e) => {
            tracing::warn!("dashboard load failed, sending to login: {:?}", e);
            drop_if_rejected(&state, &creds, &e);
            return Ok(to_login(&state).into_response());
        }
    };
    tracing::debug!(
        "loaded {} applications, {} pages",
        res.applications.len(),
        res.total_pages
    );
    let session = open_session(&state, &creds);
    session.dashboard_filter.set(filter.clone());

    let found = state
        .logos
        .lookup_all(res.applications.iter().map(|a| a.company.as_str()))
        .await;
    let applications = res
        .applications
        .into_iter()
        .map(|app| ApplicationCard::new(app, &state.logos, &found))
        .collect();

    let view = ViewPreference::load(Arc::new(CookiePreferences::from_headers(&headers)));
    let update = session.status_update.get();
    let template = Dashboard {
        service_name: &state.service_name,
        applications,
        status_options: status_options(&filter.status),
        filter,
        pager: Pager::new(
            "/dashboard",
            &current,
            PageDescriptor::from_query(&params, res.total_pages),
        ),
        current,
        grid: view.is_grid(),
        undo: update.ok.then_some(update),
        notice: session.take_notice(),
        today: date::today(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn filter(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    Form(form): Form<FilterForm>,
) -> Redirect {
    let params = build_params(&form.current, &form.filter);
    if let Some(session) = known_session(&state, &creds) {
        session.dashboard_filter.set(form.filter);
    }
    Redirect::to(&format!("/dashboard?{}", params))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    headers: HeaderMap,
    Form(input): Form<AddInput>,
) -> Response {
    if let Err(e) = input.validate() {
        tracing::debug!("rejected new application: {}", e);
        let result = ActionResult::error("Role and company are required");
        return respond(&headers, known_session(&state, &creds), "/dashboard", result);
    }
    let applied_date = date::parse_calendar_date(&input.applied_date)
        .unwrap_or_else(|| date::from_calendar_date(&date::today()));
    let application = NewApplication {
        role: input.role.trim().into(),
        company: input.company.trim().into(),
        location: input.location.trim().into(),
        applied_date,
        link: input.link.trim().into(),
        status: NEW_STATUS.into(),
    };
    match state
        .backend
        .add_application(creds.token(), &application)
        .await
    {
        Ok(()) => {
            tracing::info!("added application for {}", &application.company);
            let result = ActionResult::success("Application added successfully");
            respond(&headers, Some(open_session(&state, &creds)), "/dashboard", result)
        }
        Err(e) => {
            tracing::warn!("add application failed: {:?}", e);
            drop_if_rejected(&state, &creds, &e);
            let result = ActionResult::error("Failed to add application");
            respond(&headers, known_session(&state, &creds), "/dashboard", result)
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    headers: HeaderMap,
    Form(input): Form<IdInput>,
) -> Response {
    delete_application(&state, &creds, &headers, &input.id, "/dashboard").await
}

pub(super) async fn delete_application(
    state: &AppState,
    creds: &Credentials,
    headers: &HeaderMap,
    id: &str,
    fallback: &str,
) -> Response {
    match state.backend.delete_application(creds.token(), id).await {
        Ok(()) => {
            tracing::info!("deleted application {}", id);
            let result = ActionResult::success("Application deleted successfully");
            respond(headers, Some(open_session(state, creds)), fallback, result)
        }
        Err(e) => {
            tracing::warn!("delete application failed: {:?}", e);
            drop_if_rejected(state, creds, &e);
            let result = ActionResult::error("Failed to delete application");
            respond(headers, known_session(state, creds), fallback, result)
        }
    }
}

pub async fn edit_status(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    headers: HeaderMap,
    Form(input): Form<EditStatusInput>,
) -> Response {
    if input.validate().is_err() || !STATUSES.contains(&input.status.as_str()) {
        tracing::debug!("rejected status {:?} for {:?}", &input.status, &input.id);
        let result = ActionResult::error("Failed to update application status");
        return respond(&headers, known_session(&state, &creds), "/dashboard", result);
    }
    let operation_id = match state
        .backend
        .edit_status(creds.token(), &input.id, &input.status)
        .await
    {
        Ok(op) => op.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("edit status failed: {:?}", e);
            drop_if_rejected(&state, &creds, &e);
            let result = ActionResult::error("Failed to update application status");
            return respond(&headers, known_session(&state, &creds), "/dashboard", result);
        }
    };
    tracing::info!(
        "application {} moved {} -> {}",
        &input.id,
        &input.prev_status,
        &input.status
    );
    let session = open_session(&state, &creds);
    session.status_update.set(StatusUpdate {
        ok: true,
        job_id: input.id,
        role: input.role,
        company: input.company,
        status: input.status,
        prev_status: input.prev_status,
        operation_id,
    });
    let result = ActionResult::success("Application status updated successfully");
    respond(&headers, Some(session), "/dashboard", result)
}

fn envelope(result: &Result<Value>) -> Json<Value> {
    match result {
        Ok(data) => Json(json!({ "type": "success", "data": data })),
        Err(_) => Json(json!({ "type": "failure" })),
    }
}

pub async fn timeline(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    Form(input): Form<IdInput>,
) -> Json<Value> {
    let result = state.backend.timeline(creds.token(), &input.id).await;
    if let Err(e) = &result {
        tracing::warn!("timeline failed: {:?}", e);
        drop_if_rejected(&state, &creds, e);
    }
    envelope(&result)
}

pub async fn revert(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    headers: HeaderMap,
    Form(input): Form<RevertInput>,
) -> Response {
    let result = state
        .backend
        .revert_status(creds.token(), &input.id, &input.operation_id)
        .await;
    let session = match &result {
        Ok(_) => {
            tracing::info!("reverted status of {}", &input.id);
            let session = open_session(&state, &creds);
            session.status_update.set(StatusUpdate::default());
            Some(session)
        }
        Err(e) => {
            tracing::warn!("revert status failed: {:?}", e);
            drop_if_rejected(&state, &creds, e);
            known_session(&state, &creds)
        }
    };
    if wants_json(&headers) {
        return envelope(&result).into_response();
    }
    let action = match result {
        Ok(_) => ActionResult::success("Status change reverted"),
        Err(_) => ActionResult::error("Failed to revert status change"),
    };
    respond(&headers, session, "/dashboard", action)
}
