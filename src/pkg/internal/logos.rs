use std::{
    collections::{BTreeSet, HashMap},
    time::Duration,
};

use serde::Deserialize;
use standard_error::{Interpolate, StandardError};
use tokio::task::JoinSet;

use crate::prelude::Result;

#[derive(Deserialize)]
struct Suggestion {
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LogoClient {
    http: reqwest::Client,
    api_url: String,
    placeholder: String,
    timeout: Duration,
}

impl LogoClient {
    pub fn new(api_url: &str, placeholder: &str, timeout: Duration) -> Result<Self> {
        Ok(LogoClient {
            http: reqwest::Client::builder().build()?,
            api_url: api_url.to_string(),
            placeholder: placeholder.to_string(),
            timeout,
        })
    }

    pub async fn lookup(&self, company: &str) -> Result<Option<String>> {
        let res = self
            .http
            .get(&self.api_url)
            .query(&[("query", company)])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| StandardError::new("ERR-BACKEND-002").interpolate_err(e.to_string()))?;
        let suggestions: Vec<Suggestion> = res.json().await?;
        Ok(suggestions
            .into_iter()
            .filter_map(|s| s.logo)
            .find(|logo| !logo.is_empty()))
    }

    // one lookup per distinct company; failures and timeouts get the placeholder
    pub async fn lookup_all<'a>(
        &self,
        companies: impl IntoIterator<Item = &'a str>,
    ) -> HashMap<String, String> {
        let distinct: BTreeSet<String> = companies
            .into_iter()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        let mut set = JoinSet::new();
        for company in distinct.iter().cloned() {
            let client = self.clone();
            set.spawn(async move {
                let logo = match tokio::time::timeout(client.timeout, client.lookup(&company)).await {
                    Ok(Ok(Some(logo))) => logo,
                    Ok(Ok(None)) => client.placeholder.clone(),
                    Ok(Err(_)) => {
                        tracing::warn!("logo lookup failed for {}", &company);
                        client.placeholder.clone()
                    }
                    Err(_) => {
                        tracing::warn!("logo lookup timed out for {}", &company);
                        client.placeholder.clone()
                    }
                };
                (company, logo)
            });
        }
        let mut logos = HashMap::with_capacity(distinct.len());
        while let Some(result) = set.join_next().await {
            match result {
                Ok((company, logo)) => {
                    logos.insert(company, logo);
                }
                Err(e) => tracing::error!("logo task failed: {}", e),
            }
        }
        for company in distinct {
            logos
                .entry(company)
                .or_insert_with(|| self.placeholder.clone());
        }
        logos
    }

    pub fn pick<'m>(&'m self, logos: &'m HashMap<String, String>, company: &str) -> &'m str {
        logos
            .get(company.trim())
            .map(String::as_str)
            .unwrap_or(self.placeholder.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Json, Router, extract::Query, http::StatusCode, response::IntoResponse, routing::get};
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::testutil::serve;

    #[derive(Deserialize)]
    struct Q {
        query: String,
    }

    async fn suggest(Query(q): Query<Q>) -> axum::response::Response {
        match q.query.as_str() {
            "Acme" => Json(json!([{"name": "Acme", "logo": "https://logo.test/acme.png"}])).into_response(),
            "Empty" => Json(json!([])).into_response(),
            "Slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([{"logo": "https://logo.test/slow.png"}])).into_response()
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    async fn client() -> Arc<LogoClient> {
        let base = serve(Router::new().route("/suggest", get(suggest))).await;
        Arc::new(
            LogoClient::new(
                &format!("{}/suggest", base),
                "/static/company.svg",
                Duration::from_millis(300),
            )
            .unwrap(),
        )
    }

    #[traced_test]
    #[tokio::test]
    async fn test_failures_fall_back_to_placeholder() {
        let client = client().await;
        let logos = client
            .lookup_all(["Acme", "Acme", "Broken", "Empty", "Slow", " "])
            .await;
        assert_eq!(logos.len(), 4);
        assert_eq!(logos["Acme"], "https://logo.test/acme.png");
        assert_eq!(logos["Broken"], "/static/company.svg");
        assert_eq!(logos["Empty"], "/static/company.svg");
        assert_eq!(logos["Slow"], "/static/company.svg");
        assert_eq!(client.pick(&logos, "Nobody"), "/static/company.svg");
        assert_eq!(client.pick(&logos, "Acme "), "https://logo.test/acme.png");
    }

    #[traced_test]
    #[tokio::test]
    async fn test_nothing_to_look_up() {
        let client = client().await;
        assert!(client.lookup_all(Vec::<&str>::new()).await.is_empty());
    }
}
