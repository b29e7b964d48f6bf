use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub service_name: String,
    pub listen_port: String,
    pub backend_url: String,
    // logos
    pub logo_api_url: String,
    pub logo_placeholder: String,
    pub logo_timeout_ms: u64,
    // cookies carry `Secure` unless running on plain http locally
    pub cookie_secure: bool,
    // ui sessions
    pub session_capacity: usize,
    pub session_ttl_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .set_default("service_name", "jobtrack")?
            .set_default("listen_port", "3000")?
            .set_default("backend_url", "http://localhost:8080")?
            .set_default(
                "logo_api_url",
                "https://autocomplete.clearbit.com/v1/companies/suggest",
            )?
            .set_default("logo_placeholder", "/static/company.svg")?
            .set_default("logo_timeout_ms", 2000)?
            .set_default("cookie_secure", true)?
            .set_default("session_capacity", 10_000)?
            .set_default("session_ttl_secs", 24 * 60 * 60)?
            .add_source(Environment::default())
            .build()?;
        let mut s: Settings = conf.try_deserialize()?;
        s.backend_url = s.backend_url.trim_end_matches('/').to_string();
        Ok(s)
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_env() {
        let s = Settings::new().unwrap();
        assert!(!s.service_name.is_empty());
        assert!(!s.backend_url.ends_with('/'));
        assert!(s.logo_timeout_ms > 0);
        assert!(s.session_capacity > 0);
    }
}
