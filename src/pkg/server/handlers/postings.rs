use std::sync::Arc;

use askama::Template;
use axum::{
    Extension, Form,
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::{dashboard::FilterForm, drop_if_rejected, known_session, open_session, to_login};
use crate::{
    pkg::{
        internal::{
            filter::{Filter, PageDescriptor, QueryParams, build_params},
            prefs::{CookiePreferences, ViewPreference},
        },
        server::{
            middlewares::authn::Credentials,
            state::AppState,
            uispec::{Pager, PostingCard, Postings},
        },
    },
    prelude::Result,
};

// postings have no status, so the dropdown placeholder never applies
fn without_status(filter: Filter) -> Filter {
    Filter {
        status: String::new(),
        ..filter
    }
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
            .map(|session| session.postings_filter.get())
            .filter(|filter| *filter != Filter::default());
        if let Some(remembered) = remembered {
            tracing::debug!("restoring postings filter");
            let target = format!("/postings?{}", build_params("", &remembered));
            return Ok(Redirect::to(&target).into_response());
        }
    }

    let params = QueryParams::parse(&current);
    let filter = without_status(Filter::from_query(&params));
    let res = match state.backend.postings(creds.token(), &params).await {
        Ok(res) => res,
        Err(e) => {
            tracing::warn!("postings load failed, sending to login: {:?}", e);
            drop_if_rejected(&state, &creds, &e);
            return Ok(to_login(&state).into_response());
        }
    };
    open_session(&state, &creds)
        .postings_filter
        .set(filter.clone());
    tracing::debug!("loaded {} postings", res.postings.len());
    let found = state
        .logos
        .lookup_all(res.postings.iter().map(|p| p.company.as_str()))
        .await;
    let postings = res
        .postings
        .into_iter()
        .map(|posting| PostingCard::new(posting, &state.logos, &found))
        .collect();

    let view = ViewPreference::load(Arc::new(CookiePreferences::from_headers(&headers)));
    let template = Postings {
        service_name: &state.service_name,
        postings,
        filter,
        pager: Pager::new(
            "/postings",
            &current,
            PageDescriptor::from_query(&params, res.total_pages),
        ),
        current,
        grid: view.is_grid(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn filter(
    State(state): State<AppState>,
    Extension(creds): Extension<Arc<Credentials>>,
    Form(form): Form<FilterForm>,
) -> Redirect {
    let filter = without_status(form.filter);
    let params = build_params(&form.current, &filter);
    if let Some(session) = known_session(&state, &creds) {
        session.postings_filter.set(filter);
    }
    Redirect::to(&format!("/postings?{}", params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postings_filter_drops_status() {
        let filter = without_status(Filter::from_query(&QueryParams::parse("q=rust")));
        assert_eq!(filter.query, "rust");
        assert_eq!(filter.status, "");
        assert!(!build_params("", &filter).has("status"));
    }
}
