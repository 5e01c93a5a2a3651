use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use moka::future::Cache;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "attendance_session";

/// Maps session ids to the employee id that opened them.
///
/// Cloning shares the underlying cache.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, String>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(idle_ttl)
                .build(),
        }
    }

    /// Start a session for `employee_id` and return its id.
    pub async fn remember(&self, employee_id: &str) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .insert(session_id.clone(), employee_id.to_string())
            .await;
        session_id
    }

    pub async fn lookup(&self, session_id: &str) -> Option<String> {
        self.sessions.get(session_id).await
    }

    pub async fn forget(&self, session_id: &str) {
        self.sessions.invalidate(session_id).await;
    }
}

pub fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = session_cookie(String::new());
    cookie.make_removal();
    cookie
}

/// Session id carried by the request cookie, if any.
pub struct SessionId(pub Option<String>);

impl FromRequest for SessionId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let id = req
            .cookie(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());
        ready(Ok(SessionId(id)))
    }
}
