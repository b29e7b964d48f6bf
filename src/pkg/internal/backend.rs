use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use standard_error::{Interpolate, StandardError, Status};

use super::filter::QueryParams;
use crate::prelude::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// the backend encodes empty slices as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> core::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "objectID")]
    pub id: String,
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    /// unix seconds
    #[serde(default)]
    pub applied_date: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub applications_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Posting {
    #[serde(rename = "company_name")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    pub title: String,
    #[serde(default)]
    pub date_posted: i64,
    #[serde(default)]
    pub date_updated: i64,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub postings: Vec<Posting>,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub role: String,
    pub company: String,
    pub location: String,
    /// unix seconds
    pub applied_date: i64,
    pub link: String,
    pub status: String,
}

/// Thin JSON client for the tracker backend. Every call forwards the
/// caller's auth token as a bearer credential when there is one.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(BackendClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn login_url(&self) -> String {
        format!("{}/auth/google", self.base_url)
    }

    pub fn logout_url(&self) -> String {
        format!("{}/auth/google/logout", self.base_url)
    }

    fn url(&self, path: &str, query: Option<&QueryParams>) -> String {
        match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}{}?{}", self.base_url, path, q),
            None => format!("{}{}", self.base_url, path),
        }
    }

    async fn send(&self, req: RequestBuilder, token: Option<&str>) -> Result<Response> {
        let req = match token {
            Some(t) => req.bearer_auth(t),
            None => req,
        };
        let res = req
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-BACKEND-001").interpolate_err(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            tracing::warn!("backend answered {} for {}", status, res.url().path());
            return Err(StandardError::new("ERR-BACKEND-002")
                .interpolate_err(status.to_string())
                .code(status));
        }
        Ok(res)
    }

    async fn read<T: DeserializeOwned>(res: Response) -> Result<T> {
        res.json::<T>()
            .await
            .map_err(|e| StandardError::new("ERR-BACKEND-003").interpolate_err(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        path: &str,
        query: Option<&QueryParams>,
    ) -> Result<T> {
        let url = self.url(path, query);
        tracing::debug!("GET {}", &url);
        let res = self.send(self.http.get(url), token).await?;
        Self::read(res).await
    }

    async fn post<B: Serialize>(&self, token: Option<&str>, path: &str, body: &B) -> Result<Response> {
        let url = self.url(path, None);
        tracing::debug!("POST {}", &url);
        self.send(self.http.post(url).json(body), token).await
    }

    /// Reachability only: any HTTP answer counts.
    pub async fn ping(&self) -> Result<()> {
        self.http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-BACKEND-001").interpolate_err(e.to_string()))?;
        Ok(())
    }

    pub async fn dashboard(&self, token: Option<&str>, query: &QueryParams) -> Result<DashboardResponse> {
        self.get(token, "/user/dashboard", Some(query)).await
    }

    pub async fn profile(&self, token: Option<&str>) -> Result<Profile> {
        self.get(token, "/user/profile", None).await
    }

    pub async fn postings(&self, token: Option<&str>, query: &QueryParams) -> Result<PostingsResponse> {
        self.get(token, "/postings", Some(query)).await
    }

    pub async fn add_application(&self, token: Option<&str>, application: &NewApplication) -> Result<()> {
        self.post(token, "/user/addApplication", application).await?;
        Ok(())
    }

    pub async fn delete_application(&self, token: Option<&str>, id: &str) -> Result<()> {
        self.post(token, "/user/deleteApplication", &json!({ "id": id }))
            .await?;
        Ok(())
    }

    /// Returns the operation id the backend hands out for reverting the edit,
    /// when it sends one.
    pub async fn edit_status(&self, token: Option<&str>, id: &str, status: &str) -> Result<Option<String>> {
        let res = self
            .post(token, "/user/editStatus", &json!({ "id": id, "status": status }))
            .await?;
        let body = res.json::<Value>().await.ok();
        Ok(body
            .as_ref()
            .and_then(|b| b.get("operationID"))
            .and_then(Value::as_str)
            .map(String::from))
    }

    pub async fn timeline(&self, token: Option<&str>, id: &str) -> Result<Value> {
        let res = self
            .post(token, "/user/getApplicationTimeline", &json!({ "id": id }))
            .await?;
        Self::read(res).await
    }

    pub async fn revert_status(&self, token: Option<&str>, id: &str, operation_id: &str) -> Result<Value> {
        let res = self
            .post(
                token,
                "/user/revertStatus",
                &json!({ "id": id, "operationID": operation_id }),
            )
            .await?;
        Self::read(res).await
    }
}
