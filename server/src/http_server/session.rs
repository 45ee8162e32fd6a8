use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use axum::{extract::FromRequestParts, http};
use chrono::{DateTime, Utc};
use recipes::{MemoryStorage, ResultCache, SearchForm, SettingsStore, Storage};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use uuid::Uuid;

use super::{cookies::CookieStorage, errors::MietteError};
use crate::AppState;

const SESSION_COOKIE: &str = "session_id";

const DRAFT_FORM_KEY: &str = "searchForm";
const FLASH_ERROR_KEY: &str = "searchError";

/// Session-scoped state for one browser session.
#[derive(Debug)]
pub(crate) struct SessionEntry {
    storage: MemoryStorage,
    in_flight: AtomicBool,
    last_seen: Mutex<DateTime<Utc>>,
}

impl SessionEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            storage: MemoryStorage::new(),
            in_flight: AtomicBool::new(false),
            last_seen: Mutex::new(now),
        }
    }

    fn touch(&self, now: DateTime<Utc>) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    fn idle_since(&self) -> DateTime<Utc> {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim_search(self: &Arc<Self>) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(self.clone()))
    }
}

/// All live browser sessions. Entries exist only in memory and disappear
/// after sitting idle for longer than the configured TTL.
#[derive(Debug, Clone)]
pub(crate) struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Arc<SessionEntry>>>>,
    idle_ttl: chrono::Duration,
}

impl SessionRegistry {
    pub(crate) fn new(idle_ttl: chrono::Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    pub(crate) fn get_or_create(&self, id: Uuid) -> Arc<SessionEntry> {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let entry = sessions
            .entry(id)
            .or_insert_with(|| Arc::new(SessionEntry::new(now)));
        entry.touch(now);

        entry.clone()
    }

    /// Drops sessions idle since before `now - ttl`, returning how many went.
    pub(crate) fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle_ttl;
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle_since() >= cutoff);

        before - sessions.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) async fn sweep_forever(self, every: Duration) {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;

            let evicted = self.evict_idle(Utc::now());
            if evicted > 0 {
                tracing::debug!(evicted, remaining = self.len(), "Evicted idle sessions");
            }
        }
    }
}

/// Held while a search runs; releases the session's in-flight flag on drop.
#[derive(Debug)]
pub(crate) struct InFlightGuard(Arc<SessionEntry>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

/// The current browser, as seen by a page handler: its session-scoped
/// storage, plus the cookie jar that backs its persistent settings.
pub(crate) struct BrowserSession {
    entry: Arc<SessionEntry>,
    cookies: Cookies,
    state: AppState,
}

impl BrowserSession {
    pub(crate) fn settings(&self) -> SettingsStore<CookieStorage> {
        SettingsStore::load(CookieStorage::new(
            self.cookies.clone(),
            self.state.cookie_key.clone(),
            self.state.app.secure_cookies(),
        ))
    }

    pub(crate) fn cache(&self) -> ResultCache<MemoryStorage> {
        ResultCache::new(self.entry.storage.clone())
    }

    /// The form as the user left it: the working draft, else the form that
    /// produced the cached results, else defaults.
    pub(crate) fn form(&self) -> SearchForm {
        self.entry
            .storage
            .get(DRAFT_FORM_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .or_else(|| self.cache().source_form())
            .unwrap_or_default()
    }

    pub(crate) fn save_form(&self, form: &SearchForm) -> Result<(), MietteError> {
        let raw = serde_json::to_string(form).map_err(recipes::RecipeError::from)?;
        self.entry.storage.set(DRAFT_FORM_KEY, raw);
        Ok(())
    }

    pub(crate) fn flash_error(&self, message: impl Into<String>) {
        self.entry.storage.set(FLASH_ERROR_KEY, message.into());
    }

    pub(crate) fn take_error(&self) -> Option<String> {
        self.entry.storage.take(FLASH_ERROR_KEY)
    }

    pub(crate) fn clear_error(&self) {
        self.entry.storage.remove(FLASH_ERROR_KEY);
    }

    pub(crate) fn is_searching(&self) -> bool {
        self.entry.in_flight.load(Ordering::Acquire)
    }

    /// Claims the session's single search slot. `None` while another search
    /// from the same session is still running.
    pub(crate) fn begin_search(&self) -> Option<InFlightGuard> {
        self.entry.claim_search()
    }
}

impl FromRequestParts<AppState> for BrowserSession {
    type Rejection = MietteError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| miette::miette!("Failed to get cookies: {msg}"))?;

        let private = cookies.private(&state.cookie_key);

        let existing = private
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

        let session_id = if let Some(session_id) = existing {
            session_id
        } else {
            let session_id = Uuid::new_v4();
            tracing::debug!(%session_id, "Starting new browser session");

            let session_cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
                .path("/")
                .http_only(true)
                .secure(state.app.secure_cookies())
                .same_site(SameSite::Lax);
            private.add(session_cookie.into());

            session_id
        };

        Ok(Self {
            entry: state.sessions.get_or_create(session_id),
            cookies,
            state: state.clone(),
        })
    }
}
