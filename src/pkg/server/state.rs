use std::{sync::Arc, time::Duration};

use crate::{
    conf::{Settings, settings},
    pkg::internal::{backend::BackendClient, logos::LogoClient, session::Sessions},
    prelude::Result,
};

#[derive(Clone)]
pub struct AppState {
    pub service_name: Arc<str>,
    pub backend: Arc<BackendClient>,
    pub logos: Arc<LogoClient>,
    pub sessions: Arc<Sessions>,
    pub cookie_secure: bool,
}

impl AppState {
    pub async fn new() -> Result<AppState> {
        AppState::from_settings(&settings)
    }

    pub fn from_settings(conf: &Settings) -> Result<AppState> {
        Ok(AppState {
            service_name: conf.service_name.as_str().into(),
            backend: Arc::new(BackendClient::new(&conf.backend_url)?),
            logos: Arc::new(LogoClient::new(
                &conf.logo_api_url,
                &conf.logo_placeholder,
                Duration::from_millis(conf.logo_timeout_ms),
            )?),
            sessions: Arc::new(Sessions::new(
                conf.session_capacity,
                Duration::from_secs(conf.session_ttl_secs),
            )),
            cookie_secure: conf.cookie_secure,
        })
    }
}
