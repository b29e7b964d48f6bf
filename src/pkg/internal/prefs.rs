use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue, header::SET_COOKIE};
use axum_extra::extract::CookieJar;

use super::store::Store;
use crate::prelude::Result;

pub const VIEW_PREFERENCE_KEY: &str = "view_preference";
const PREFERENCE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

/// Key-value storage for user preferences, supplied by whatever hosts them.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Preferences kept in the browser: reads come from the request cookies,
/// writes are queued and turned into `Set-Cookie` headers for the response.
pub struct CookiePreferences {
    jar: CookieJar,
    written: Mutex<Vec<(String, String)>>,
}

impl CookiePreferences {
    pub fn new(jar: CookieJar) -> Self {
        CookiePreferences {
            jar,
            written: Mutex::new(vec![]),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(CookieJar::from_headers(headers))
    }

    pub fn set_cookie_headers(&self) -> Result<HeaderMap> {
        let written = self.written.lock().unwrap_or_else(|e| e.into_inner());
        let mut headers = HeaderMap::new();
        for (key, value) in written.iter() {
            headers.append(
                SET_COOKIE,
                HeaderValue::from_str(&format!(
                    "{}={}; Path=/; Max-Age={}; SameSite=Lax",
                    key, value, PREFERENCE_MAX_AGE
                ))?,
            );
        }
        Ok(headers)
    }
}

impl PreferenceStore for CookiePreferences {
    fn get(&self, key: &str) -> Option<String> {
        let written = self.written.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, v)) = written.iter().rev().find(|(k, _)| k == key) {
            return Some(v.clone());
        }
        self.jar.get(key).map(|c| c.value().to_string())
    }

    fn set(&self, key: &str, value: &str) {
        let mut written = self.written.lock().unwrap_or_else(|e| e.into_inner());
        written.retain(|(k, _)| k != key);
        written.push((key.into(), value.into()));
    }
}

/// Grid or list layout for application and posting lists. Read from the
/// preference store once, written back on every change.
pub struct ViewPreference {
    grid: Store<bool>,
}

impl ViewPreference {
    pub fn load(prefs: Arc<dyn PreferenceStore>) -> Self {
        let initial = prefs.get(VIEW_PREFERENCE_KEY).as_deref() == Some("true");
        let grid = Store::new(initial);
        grid.subscribe(move |value: &bool| prefs.set(VIEW_PREFERENCE_KEY, &value.to_string()));
        ViewPreference { grid }
    }

    pub fn is_grid(&self) -> bool {
        self.grid.get()
    }

    pub fn toggle(&self) -> bool {
        self.grid.update(|g| *g = !*g);
        self.grid.get()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::http::header::COOKIE;

    use super::*;

    #[derive(Default)]
    struct MemoryPreferences {
        values: Mutex<HashMap<String, String>>,
    }

    impl PreferenceStore for MemoryPreferences {
        fn get(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.values.lock().unwrap().insert(key.into(), value.into());
        }
    }

    #[test]
    fn test_view_defaults_to_list() {
        let prefs = Arc::new(MemoryPreferences::default());
        assert!(!ViewPreference::load(prefs.clone()).is_grid());
        prefs.set(VIEW_PREFERENCE_KEY, "yes");
        assert!(!ViewPreference::load(prefs).is_grid());
    }

    #[test]
    fn test_view_written_on_change() {
        let prefs = Arc::new(MemoryPreferences::default());
        let view = ViewPreference::load(prefs.clone());
        assert!(view.toggle());
        assert_eq!(prefs.get(VIEW_PREFERENCE_KEY).as_deref(), Some("true"));
        assert!(!view.toggle());
        assert_eq!(prefs.get(VIEW_PREFERENCE_KEY).as_deref(), Some("false"));
        assert!(!ViewPreference::load(prefs).is_grid());
    }

    #[test]
    fn test_cookie_preferences() {
        let mut request = HeaderMap::new();
        request.insert(
            COOKIE,
            HeaderValue::from_static("authToken=abc; view_preference=true"),
        );
        let prefs = Arc::new(CookiePreferences::from_headers(&request));
        let view = ViewPreference::load(prefs.clone());
        assert!(view.is_grid());
        assert!(prefs.set_cookie_headers().unwrap().is_empty());

        assert!(!view.toggle());
        let headers = prefs.set_cookie_headers().unwrap();
        let cookies: Vec<_> = headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);
        assert!(
            cookies[0]
                .to_str()
                .unwrap()
                .starts_with("view_preference=false; Path=/")
        );
    }
}
