//! Per-browser admin sessions keyed by a cookie

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use chess_stats_core::Credential;

pub const SESSION_COOKIE: &str = "chess_stats_session";

#[derive(Default)]
struct Session {
    credential: Option<Credential>,
    /// One-shot message shown on the next admin page render
    flash: Option<String>,
}

/// Credentials and flash messages of every browser talking to the dashboard
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn credential(&self, session: &SessionId) -> Option<Credential> {
        self.lock()
            .get(&session.id)
            .and_then(|s| s.credential.clone())
    }

    pub fn sign_in(&self, session: &SessionId, credential: Credential) {
        self.lock().entry(session.id.clone()).or_default().credential = Some(credential);
    }

    pub fn sign_out(&self, session: &SessionId) {
        if let Some(s) = self.lock().get_mut(&session.id) {
            s.credential = None;
        }
    }

    /// Forget a session entirely
    pub fn discard(&self, session: &SessionId) {
        self.lock().remove(&session.id);
    }

    pub fn set_flash(&self, session: &SessionId, message: impl Into<String>) {
        self.lock().entry(session.id.clone()).or_default().flash = Some(message.into());
    }

    /// Take the pending flash message. A session left with no credential
    /// is dropped along with it.
    pub fn take_flash(&self, session: &SessionId) -> Option<String> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(&session.id)?;
        let flash = entry.flash.take();
        if entry.credential.is_none() {
            sessions.remove(&session.id);
        }
        flash
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Session id of one request.
///
/// Browsers without the cookie get a fresh id, which is handed back through
/// `Set-Cookie` on the response built by [`SessionId::redirect`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionId {
    id: String,
    is_new: bool,
}

impl SessionId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers, SESSION_COOKIE) {
            Some(id) => Self { id, is_new: false },
            None => Self::fresh(),
        }
    }

    pub fn fresh() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_new: true,
        }
    }

    #[cfg(test)]
    fn as_str(&self) -> &str {
        &self.id
    }

    fn cookie(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.id)
    }

    pub fn redirect(&self, to: &str) -> Response {
        let redirect = Redirect::to(to);
        if !self.is_new {
            return redirect.into_response();
        }

        match HeaderValue::from_str(&self.cookie()) {
            Ok(cookie) => ([(header::SET_COOKIE, cookie)], redirect).into_response(),
            Err(e) => {
                tracing::warn!("Could not set session cookie: {}", e);
                redirect.into_response()
            }
        }
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_id_read_from_cookie() {
        let headers = headers_with_cookie("theme=dark; chess_stats_session=abc-123");
        let session = SessionId::from_headers(&headers);

        assert_eq!(session.as_str(), "abc-123");
        let response = session.redirect("/admin");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn test_missing_cookie_mints_new_id() {
        let first = SessionId::from_headers(&HeaderMap::new());
        let second = SessionId::from_headers(&headers_with_cookie("chess_stats_session="));

        assert_ne!(first.as_str(), second.as_str());
        let response = first.redirect("/admin");
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("chess_stats_session="));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::default();
        let alice = SessionId::fresh();
        let bob = SessionId::fresh();

        store.sign_in(&alice, Credential::basic("admin", "secret"));
        store.set_flash(&alice, "Signed in");

        assert!(store.credential(&alice).is_some());
        assert!(store.credential(&bob).is_none());
        assert_eq!(store.take_flash(&bob), None);
        assert_eq!(store.take_flash(&alice).as_deref(), Some("Signed in"));
        assert_eq!(store.take_flash(&alice), None);
    }

    #[test]
    fn test_anonymous_session_dropped_after_flash() {
        let store = SessionStore::default();
        let visitor = SessionId::fresh();

        store.set_flash(&visitor, "Authentication failed");
        assert_eq!(store.len(), 1);
        assert!(store.take_flash(&visitor).is_some());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_sign_out_keeps_flash() {
        let store = SessionStore::default();
        let session = SessionId::fresh();

        store.sign_in(&session, Credential::basic("admin", "secret"));
        store.sign_out(&session);
        store.set_flash(&session, "Signed out");

        assert!(store.credential(&session).is_none());
        assert_eq!(store.take_flash(&session).as_deref(), Some("Signed out"));
    }
}
