use actix_web::cookie::Cookie;
use tracing::error;

use super::gate::authorize;
use super::session::{SessionId, session_cookie};
use crate::error::AppError;
use crate::state::AppState;

/// A caller allowed to read attendance data.
pub struct Granted {
    pub employee_id: String,
    /// Set when a new session was opened for this caller.
    pub cookie: Option<Cookie<'static>>,
}

/// Run the authorization gate for a data request.
///
/// An explicit `empId` wins over the session; when it is granted it is
/// mirrored into a fresh session so later requests can omit it. Any session
/// the request arrived with is dropped at that point.
pub async fn require_access(
    state: &AppState,
    emp_id: Option<&str>,
    session: &SessionId,
) -> Result<Granted, AppError> {
    let explicit = emp_id.map(str::trim).filter(|s| !s.is_empty());

    let session_owner = match &session.0 {
        Some(sid) => state.sessions.lookup(sid).await,
        None => None,
    };
    let candidate = explicit.map(str::to_string).or_else(|| session_owner.clone());

    let decision = authorize(candidate.as_deref(), &state.policy, state.directory.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Authorization lookup failed");
            AppError::Store(e)
        })?;

    let employee_id = match decision.employee_id {
        Some(id) if decision.granted => id,
        _ => return Err(AppError::Forbidden(decision.reason)),
    };

    let cookie = match explicit {
        Some(id) if session_owner.as_deref() != Some(id) => {
            // The superseded session must not outlive its replacement.
            if let Some(sid) = &session.0 {
                state.sessions.forget(sid).await;
            }
            Some(session_cookie(state.sessions.remember(&employee_id).await))
        }
        _ => None,
    };

    Ok(Granted {
        employee_id,
        cookie,
    })
}
