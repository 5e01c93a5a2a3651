use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, HttpResponseBuilder, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, instrument};
use utoipa::IntoParams;

use crate::auth::access::{Granted, require_access};
use crate::auth::session::SessionId;
use crate::error::AppError;
use crate::export::{EXPORT_COLUMNS, XLSX_CONTENT_TYPE, export_filename, format_for_export};
use crate::model::attendance::AttendanceRecord;
use crate::query::{FilterRequest, Period, Projection};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceParams {
    /// all | week | month | year | custom
    #[param(example = "custom")]
    pub filter: Option<String>,
    /// YYYY-MM-DD, used with filter=custom
    #[param(example = "2024-03-01")]
    pub start_date: Option<String>,
    /// YYYY-MM-DD, used with filter=custom
    #[param(example = "2024-03-31")]
    pub end_date: Option<String>,
    /// Case-insensitive match on employee name or id
    pub search: Option<String>,
    /// `sang`, `chieu` or a literal shift label
    #[param(example = "sang")]
    pub shift: Option<String>,
    /// Employee id of the caller; optional once a session exists
    #[param(example = "A001")]
    pub emp_id: Option<String>,
}

impl AttendanceParams {
    pub fn filter_request(&self) -> FilterRequest {
        FilterRequest {
            period: Period::parse(self.filter.as_deref()),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            search: self.search.clone(),
            shift: self.shift.clone(),
        }
    }
}

fn respond(granted: &Granted, mut builder: HttpResponseBuilder) -> HttpResponseBuilder {
    if let Some(cookie) = &granted.cookie {
        builder.cookie(cookie.clone());
    }
    builder
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendances",
    params(AttendanceParams),
    responses(
        (status = 200, description = "Matching records, newest first", body = [AttendanceRecord]),
        (status = 400, description = "Malformed date range (strict mode only)", body = Object, example = json!({
            "error": "startDate 'x' is not a YYYY-MM-DD date"
        })),
        (status = 403, description = "Caller may not read attendance data", body = Object, example = json!({
            "error": "not permitted"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Attendance"
)]
#[instrument(name = "list_attendances", skip(state, params, session), fields(filter = ?params.filter))]
pub async fn list_attendances(
    state: web::Data<AppState>,
    params: web::Query<AttendanceParams>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    let granted = require_access(&state, params.emp_id.as_deref(), &session).await?;

    let request = params.filter_request();
    let query = state
        .builder
        .build(&request, Projection::list_view(), Utc::now())?;

    let records = state.store.find(&query).await?;
    info!(employee_id = %granted.employee_id, count = records.len(), "Attendances listed");

    Ok(respond(&granted, HttpResponse::Ok()).json(records))
}

/// Download attendance records as an Excel workbook
#[utoipa::path(
    get,
    path = "/api/export-excel",
    params(AttendanceParams),
    responses(
        (status = 200, description = "xlsx workbook sent as an attachment"),
        (status = 400, description = "Malformed date range (strict mode only)"),
        (status = 403, description = "Caller may not read attendance data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(name = "export_excel", skip(state, params, session), fields(filter = ?params.filter))]
pub async fn export_excel(
    state: web::Data<AppState>,
    params: web::Query<AttendanceParams>,
    session: SessionId,
) -> Result<HttpResponse, AppError> {
    let granted = require_access(&state, params.emp_id.as_deref(), &session).await?;

    let request = params.filter_request();
    let now = Utc::now();
    let query = state
        .builder
        .build(&request, Projection::export_view(), now)?;

    let records = state.store.find(&query).await?;

    let offset = state.builder.offset;
    let workbook = format_for_export(&records, EXPORT_COLUMNS, offset).map_err(|e| {
        error!(error = %e, "Failed to render workbook");
        AppError::Export(e.to_string())
    })?;

    let filename = export_filename(
        &state.export_prefix,
        &request,
        &query.filter,
        offset,
        now.with_timezone(&offset).date_naive(),
    );
    info!(employee_id = %granted.employee_id, count = records.len(), %filename, "Attendances exported");

    Ok(respond(&granted, HttpResponse::Ok())
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(workbook))
}
