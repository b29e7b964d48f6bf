use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::date;

// dropdown placeholder, means no status filter
pub const STATUS_SENTINEL: &str = "Status";

pub const STATUSES: [&str; 6] = [
    "Applied",
    "Screen",
    "Interviewing",
    "Offer",
    "Rejected",
    "Ghosted",
];

// `page` is the backend's 0-based index; users see index + 1
pub const FIRST_PAGE: u32 = 0;

pub const HITS_MIN: u32 = 10;
pub const HITS_MAX: u32 = 18;

const SCRATCH_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            return Self::default();
        }
        let pairs = match Url::parse(SCRATCH_BASE) {
            Ok(mut url) => {
                url.set_query(Some(query));
                url.query_pairs().into_owned().collect()
            }
            Err(_) => vec![],
        };
        QueryParams { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                self.pairs[idx].1 = value;
                let mut seen = 0;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn delete(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    fn set_or_delete(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.delete(key);
        } else {
            self.set(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn page(&self) -> u32 {
        self.get("page")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(FIRST_PAGE)
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pairs.is_empty() {
            return Ok(());
        }
        let mut url = Url::parse(SCRATCH_BASE).map_err(|_| fmt::Error)?;
        url.query_pairs_mut().extend_pairs(&self.pairs);
        f.write_str(url.query().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Filter {
    pub query: String,
    pub company: String,
    pub role: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
}

impl Filter {
    pub fn dashboard() -> Self {
        Filter {
            status: STATUS_SENTINEL.into(),
            ..Default::default()
        }
    }

    pub fn from_query(params: &QueryParams) -> Self {
        let text = |key: &str| params.get(key).unwrap_or_default().to_string();
        let day = |key: &str| {
            params
                .get(key)
                .and_then(|ms| ms.trim().parse::<i64>().ok())
                .map(|ms| date::to_input_date(date::millis_to_seconds(ms)))
                .unwrap_or_default()
        };
        Filter {
            query: text("q"),
            company: text("company"),
            role: text("role"),
            location: text("location"),
            start_date: day("startDate"),
            end_date: day("endDate"),
            status: params.get("status").unwrap_or(STATUS_SENTINEL).to_string(),
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self.status.trim() {
            "" | STATUS_SENTINEL => None,
            s => Some(s),
        }
    }
}

fn date_bound_millis(day: &str) -> Option<i64> {
    if day.trim().is_empty() {
        return None;
    }
    match date::parse_calendar_date(day) {
        Some(secs) => Some(date::seconds_to_millis(secs)),
        None => {
            tracing::debug!("dropping unparseable date filter {}", day);
            None
        }
    }
}

/// Applies `filter` to `current`: empty fields drop their key, dates go out
/// as milliseconds and the page resets.
pub fn build_params(current: &str, filter: &Filter) -> QueryParams {
    let mut params = QueryParams::parse(current);
    params.set_or_delete("q", filter.query.trim());
    params.set_or_delete("company", filter.company.trim());
    params.set_or_delete("role", filter.role.trim());
    params.set_or_delete("location", filter.location.trim());
    params.set_or_delete("status", filter.status().unwrap_or_default());
    for (key, day) in [("startDate", &filter.start_date), ("endDate", &filter.end_date)] {
        match date_bound_millis(day) {
            Some(ms) => params.set(key, ms.to_string()),
            None => params.delete(key),
        }
    }
    params.set("page", FIRST_PAGE.to_string());
    params
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Next,
    Prev,
    // as shown to the user, from 1
    Page(u32),
}

pub fn change_page(current: &str, direction: PageDirection) -> QueryParams {
    let mut params = QueryParams::parse(current);
    let page = params.page();
    let next = match direction {
        PageDirection::Next => page.saturating_add(1),
        PageDirection::Prev => page.saturating_sub(1),
        PageDirection::Page(shown) => shown.saturating_sub(1),
    };
    params.set("page", next.to_string());
    params
}

pub fn change_hits(current: &str, hits: u32) -> QueryParams {
    let mut params = QueryParams::parse(current);
    params.set("hits", hits.clamp(HITS_MIN, HITS_MAX).to_string());
    params.set("page", FIRST_PAGE.to_string());
    params
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageDescriptor {
    pub index: u32,
    pub total_pages: u32,
}

impl PageDescriptor {
    pub fn new(index: u32, total_pages: u32) -> Self {
        PageDescriptor { index, total_pages }
    }

    pub fn from_query(params: &QueryParams, total_pages: u32) -> Self {
        PageDescriptor::new(params.page(), total_pages)
    }

    pub fn display_number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    pub fn display_total(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.display_number() < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl QueryParams {
        pub(crate) fn has(&self, key: &str) -> bool {
            self.pairs.iter().any(|(k, _)| k == key)
        }
    }

    #[test]
    fn test_parse_and_encode() {
        let params = QueryParams::parse("?q=rust+dev&company=A%26B&page=2");
        assert_eq!(params.get("q"), Some("rust dev"));
        assert_eq!(params.get("company"), Some("A&B"));
        assert_eq!(params.page(), 2);
        assert_eq!(params.to_string(), "q=rust+dev&company=A%26B&page=2");
        assert_eq!(QueryParams::parse("").to_string(), "");
    }

    #[test]
    fn test_set_replaces_first_and_drops_repeats() {
        let mut params = QueryParams::parse("a=1&page=3&b=2&page=4");
        params.set("page", "0");
        assert_eq!(params.to_string(), "a=1&page=0&b=2");
        params.set("hits", "12");
        assert_eq!(params.to_string(), "a=1&page=0&b=2&hits=12");
    }

    #[test]
    fn test_status_sentinel_is_dropped() {
        let filter = Filter {
            status: STATUS_SENTINEL.into(),
            ..Default::default()
        };
        let params = build_params("status=Applied", &filter);
        assert!(!params.has("status"));
        let params = build_params("", &Filter::dashboard());
        assert!(!params.has("status"));
        assert!(!params.has("q"));
    }

    #[test]
    fn test_build_params_maps_fields() {
        let filter = Filter {
            query: "engineer".into(),
            company: " Acme ".into(),
            role: "".into(),
            location: "Remote".into(),
            status: "Interviewing".into(),
            ..Default::default()
        };
        let params = build_params("role=old&hits=14&page=5", &filter);
        assert_eq!(params.get("q"), Some("engineer"));
        assert_eq!(params.get("company"), Some("Acme"));
        assert!(!params.has("role"));
        assert_eq!(params.get("location"), Some("Remote"));
        assert_eq!(params.get("status"), Some("Interviewing"));
        assert_eq!(params.get("hits"), Some("14"));
    }

    #[test]
    fn test_build_params_always_resets_page() {
        for current in ["", "page=7", "q=x&page=abc", "page=0"] {
            let filter = Filter {
                query: "engineer".into(),
                ..Filter::dashboard()
            };
            assert_eq!(build_params(current, &filter).get("page"), Some("0"));
        }
    }

    #[test]
    fn test_build_params_dates_are_millis() {
        let filter = Filter {
            start_date: "2024-03-15".into(),
            end_date: "not-a-date".into(),
            ..Default::default()
        };
        let params = build_params("endDate=1", &filter);
        let expected = date::seconds_to_millis(date::from_calendar_date("2024-03-15"));
        assert_eq!(params.get("startDate"), Some(expected.to_string().as_str()));
        assert!(!params.has("endDate"));
    }

    #[test]
    fn test_epoch_date_bound_is_kept() {
        let filter = Filter {
            start_date: "1970-01-01".into(),
            ..Default::default()
        };
        let expected = date::parse_calendar_date("1970-01-01").map(date::seconds_to_millis);
        assert!(expected.is_some());
        let params = build_params("", &filter);
        assert_eq!(
            params.get("startDate").map(String::from),
            expected.map(|ms| ms.to_string())
        );
    }

    #[test]
    fn test_filter_from_query_round_trip() {
        let filter = Filter {
            query: "data".into(),
            start_date: "2024-01-02".into(),
            end_date: "2024-02-03".into(),
            status: "Offer".into(),
            ..Default::default()
        };
        let params = build_params("", &filter);
        assert_eq!(Filter::from_query(&params), filter);
        assert_eq!(Filter::from_query(&QueryParams::default()), Filter::dashboard());
    }

    #[test]
    fn test_change_page() {
        assert_eq!(change_page("page=0", PageDirection::Prev).get("page"), Some("0"));
        assert_eq!(change_page("", PageDirection::Prev).get("page"), Some("0"));
        assert_eq!(change_page("page=4", PageDirection::Prev).get("page"), Some("3"));
        assert_eq!(change_page("page=4", PageDirection::Next).get("page"), Some("5"));
        assert_eq!(change_page("", PageDirection::Next).get("page"), Some("1"));
        assert_eq!(change_page("page=9", PageDirection::Page(3)).get("page"), Some("2"));
        assert_eq!(change_page("", PageDirection::Page(0)).get("page"), Some("0"));
        let params = change_page("q=go&page=1", PageDirection::Next);
        assert_eq!(params.to_string(), "q=go&page=2");
    }

    #[test]
    fn test_change_hits_clamps() {
        assert_eq!(change_hits("page=3", 50).get("hits"), Some("18"));
        assert_eq!(change_hits("", 1).get("hits"), Some("10"));
        let params = change_hits("page=3&hits=10", 14);
        assert_eq!(params.to_string(), "page=0&hits=14");
    }

    #[test]
    fn test_page_descriptor() {
        let page = PageDescriptor::from_query(&QueryParams::parse("page=2"), 3);
        assert_eq!(page.display_number(), 3);
        assert!(page.has_prev());
        assert!(!page.has_next());
        let first = PageDescriptor::new(0, 0);
        assert_eq!(first.display_total(), 1);
        assert!(!first.has_prev());
        assert!(!first.has_next());
    }
}
