use crate::auth::handlers::LoginResponse;
use crate::model::attendance::AttendanceRecord;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Report API",
        version = "1.0.0",
        description = r#"
## GPS Attendance Reporting

Read-only reporting over GPS check-in records.

### 🔹 Key Features
- **Attendance list** filtered by period (`all`, `week`, `month`, `year`, `custom`),
  free-text search on employee name or id, and shift (`sang`, `chieu` or a literal label)
- **Excel export** of the same filtered data

### 🔐 Access
Callers identify themselves with `empId`. Only employee ids on the configured
allow-list may read data. A successful `/login` opens a cookie session so later
requests can omit `empId`.

### 🕒 Time zone
Period boundaries are computed in the configured local offset (UTC+7 by default).
"#,
    ),
    paths(
        crate::api::attendance::list_attendances,
        crate::api::attendance::export_excel,
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
    ),
    components(schemas(AttendanceRecord, LoginResponse)),
    tags(
        (name = "Attendance", description = "Attendance reporting APIs"),
        (name = "Auth", description = "Employee-id login and sessions"),
    )
)]
pub struct ApiDoc;
