use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use serde::Serialize;

use super::{filter::Filter, store::Store};

/// Last status edit, kept so the dashboard can offer to undo it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub ok: bool,
    pub job_id: String,
    pub role: String,
    pub company: String,
    pub status: String,
    pub prev_status: String,
    /// handle the backend wants back to undo the edit
    pub operation_id: String,
}

/// Outcome of the last form action, shown once on the next page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub ok: bool,
    pub message: String,
}

pub struct SessionState {
    pub dashboard_filter: Store<Filter>,
    pub postings_filter: Store<Filter>,
    pub status_update: Store<StatusUpdate>,
    pub notice: Store<Option<Notice>>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            dashboard_filter: Store::new(Filter::dashboard()),
            postings_filter: Store::default(),
            status_update: Store::default(),
            notice: Store::default(),
        }
    }
}

impl SessionState {
    pub fn take_notice(&self) -> Option<Notice> {
        let notice = self.notice.get();
        if notice.is_some() {
            self.notice.set(None);
        }
        notice
    }
}

struct Entry {
    state: Arc<SessionState>,
    last_seen: Instant,
}

/// Per-user UI state, keyed by the auth token the browser presents. Entries
/// are only opened for tokens the backend has accepted, idle ones expire and
/// the oldest is evicted once `capacity` is reached.
pub struct Sessions {
    inner: Mutex<HashMap<String, Entry>>,
    capacity: usize,
    ttl: Duration,
}

impl Sessions {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Sessions {
            inner: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, token: &str) -> Option<Arc<SessionState>> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(token)?;
        if entry.last_seen.elapsed() > self.ttl {
            sessions.remove(token);
            tracing::debug!("ui session expired");
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.state.clone())
    }

    /// Call only once the backend has accepted `token`.
    pub fn open(&self, token: &str) -> Arc<SessionState> {
        if let Some(state) = self.get(token) {
            return state;
        }
        let mut sessions = self.lock();
        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= ttl);
        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(token, _)| token.clone());
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    tracing::debug!("evicted least recent ui session");
                }
                None => break,
            }
        }
        tracing::debug!("opening ui session");
        let state = Arc::new(SessionState::default());
        sessions.insert(
            token.to_string(),
            Entry {
                state: state.clone(),
                last_seen: Instant::now(),
            },
        );
        state
    }

    pub fn forget(&self, token: &str) {
        if self.lock().remove(token).is_some() {
            tracing::debug!("ui session closed");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_sessions_are_per_token() {
        let sessions = Sessions::new(100, HOUR);
        assert!(sessions.get("a").is_none());
        assert_eq!(sessions.len(), 0);
        let a = sessions.open("a");
        a.dashboard_filter.update(|f| f.company = "Acme".into());
        assert_eq!(sessions.get("a").unwrap().dashboard_filter.get().company, "Acme");
        assert_eq!(sessions.open("b").dashboard_filter.get(), Filter::dashboard());
        assert_eq!(sessions.len(), 2);
        sessions.forget("a");
        assert!(sessions.get("a").is_none());
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let sessions = Sessions::new(2, HOUR);
        let tick = || std::thread::sleep(Duration::from_millis(2));
        sessions.open("a");
        tick();
        sessions.open("b");
        tick();
        // touch a so b is the oldest
        sessions.get("a");
        tick();
        sessions.open("c");
        assert_eq!(sessions.len(), 2);
        assert!(sessions.get("a").is_some());
        assert!(sessions.get("b").is_none());
        assert!(sessions.get("c").is_some());
    }

    #[test]
    fn test_idle_sessions_expire() {
        let sessions = Sessions::new(10, Duration::ZERO);
        sessions.open("a");
        std::thread::sleep(Duration::from_millis(5));
        assert!(sessions.get("a").is_none());
        sessions.open("b");
        std::thread::sleep(Duration::from_millis(5));
        sessions.open("c");
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_notice_is_shown_once() {
        let session = SessionState::default();
        assert!(!session.status_update.get().ok);
        assert_eq!(session.postings_filter.get(), Filter::default());
        session.notice.set(Some(Notice {
            ok: true,
            message: "done".into(),
        }));
        assert_eq!(session.take_notice().map(|n| n.message).as_deref(), Some("done"));
        assert_eq!(session.take_notice(), None);
    }
}
