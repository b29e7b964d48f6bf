use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use super::handlers::{
    auth::{auth_complete, google_logout, logout_complete},
    dashboard, postings,
    probes::{healthz, livez},
    profile,
    ui::{company_logo, home, toggle_view},
};
use super::middlewares::authn;
use super::state::AppState;

pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/auth-complete", get(auth_complete))
        .route("/logout-complete", get(logout_complete))
        .route("/auth/google/logout", get(google_logout))
        .route("/dashboard", get(dashboard::load))
        .route("/dashboard/filter", post(dashboard::filter))
        .route("/dashboard/add", post(dashboard::add))
        .route("/dashboard/delete", post(dashboard::delete))
        .route("/dashboard/editstatus", post(dashboard::edit_status))
        .route("/dashboard/timeline", post(dashboard::timeline))
        .route("/dashboard/revert", post(dashboard::revert))
        .route("/view", post(toggle_view))
        .route("/postings", get(postings::load))
        .route("/postings/filter", post(postings::filter))
        .route("/profile", get(profile::load))
        .route("/profile/delete", post(profile::delete))
        .route("/static/company.svg", get(company_logo))
        .layer(from_fn(authn::relay_token))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state)
}
