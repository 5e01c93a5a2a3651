use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use super::gate::authorize;
use super::session::{SessionId, expired_session_cookie, session_cookie};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    #[param(example = "A001")]
    pub emp_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Login successful")]
    pub message: String,
    #[schema(example = "A001")]
    pub employee_id: Option<String>,
    #[schema(example = "Nguyen Van A")]
    pub employee_name: Option<String>,
}

/// Log in with an employee id
#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 200, description = "Access granted; session cookie set", body = LoginResponse),
        (status = 403, description = "Access denied", body = LoginResponse, example = json!({
            "success": false,
            "message": "not permitted",
            "employeeId": "X999",
            "employeeName": null
        })),
        (status = 500, description = "Internal server error", body = LoginResponse)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(state, query), fields(emp_id = ?query.emp_id))]
pub async fn login(state: web::Data<AppState>, query: web::Query<LoginQuery>) -> impl Responder {
    info!("Login request received");

    let requested_id = query
        .emp_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let decision = match authorize(
        requested_id.as_deref(),
        &state.policy,
        state.directory.as_ref(),
    )
    .await
    {
        Ok(d) => d,
        Err(e) => {
            error!(error = %e, "Directory error during login");
            return HttpResponse::InternalServerError().json(LoginResponse {
                success: false,
                message: "Something went wrong, Contact with system admin".into(),
                employee_id: requested_id,
                employee_name: None,
            });
        }
    };

    let employee_id = match decision.employee_id {
        Some(id) if decision.granted => id,
        denied_id => {
            info!(reason = %decision.reason, "Login denied");
            return HttpResponse::Forbidden().json(LoginResponse {
                success: false,
                message: decision.reason.to_string(),
                employee_id: denied_id,
                employee_name: None,
            });
        }
    };

    // Name lookup is best effort when the gate did not already consult the directory.
    let employee_name = match decision.employee_name {
        Some(name) => Some(name),
        None => match state.directory.find_by_employee_id(&employee_id).await {
            Ok(entry) => entry.and_then(|e| e.employee_name),
            Err(e) => {
                warn!(error = %e, "Failed to look up employee name");
                None
            }
        },
    };

    let session_id = state.sessions.remember(&employee_id).await;
    debug!(%employee_id, "Session opened");

    info!("Login successful");

    HttpResponse::Ok()
        .cookie(session_cookie(session_id))
        .json(LoginResponse {
            success: true,
            message: "Login successful".into(),
            employee_id: Some(employee_id),
            employee_name,
        })
}

/// Drop the current session
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 200, description = "Session cleared", body = Object, example = json!({
            "message": "Logged out"
        }))
    ),
    tag = "Auth"
)]
pub async fn logout(state: web::Data<AppState>, session: SessionId) -> impl Responder {
    if let Some(sid) = &session.0 {
        state.sessions.forget(sid).await;
    }

    HttpResponse::Ok()
        .cookie(expired_session_cookie())
        .json(serde_json::json!({ "message": "Logged out" }))
}
