use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One GPS check-in as stored in the attendance collection.
///
/// Only `EmployeeId` is guaranteed; every other field may be missing from a
/// given record or left out by the projection, in which case it is omitted
/// from the JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
#[schema(
    example = json!({
        "EmployeeId": "A001",
        "EmployeeName": "Nguyen Van A",
        "Address": "12 Le Loi, District 1",
        "ProjectId": "PRJ-07",
        "Tasks": ["Site survey", "Report"],
        "OtherNote": "",
        "CheckinTime": "2024-03-31T01:15:00Z",
        "Shift": "Ca 1 - Sáng",
        "Status": "On time"
    })
)]
pub struct AttendanceRecord {
    #[schema(example = "A001")]
    pub employee_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_note: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub checkin_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Verification photo reference. Never exported to spreadsheets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_image: Option<String>,
}

/// Record fields addressable by filters and projections.
///
/// Has no variant for the storage row id, so no projection can name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    EmployeeId,
    EmployeeName,
    Address,
    ProjectId,
    Tasks,
    OtherNote,
    CheckinTime,
    Shift,
    Status,
    FaceImage,
}

impl Field {
    /// Column name in the SQL table.
    pub fn column(&self) -> &'static str {
        match self {
            Field::EmployeeId => "employee_id",
            Field::EmployeeName => "employee_name",
            Field::Address => "address",
            Field::ProjectId => "project_id",
            Field::Tasks => "tasks",
            Field::OtherNote => "other_note",
            Field::CheckinTime => "checkin_time",
            Field::Shift => "shift",
            Field::Status => "status",
            Field::FaceImage => "face_image",
        }
    }
}

impl AttendanceRecord {
    /// Text value of a field, as used by substring predicates.
    /// List fields are joined with `", "`; timestamps are RFC 3339.
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::EmployeeId => Some(self.employee_id.clone()),
            Field::EmployeeName => self.employee_name.clone(),
            Field::Address => self.address.clone(),
            Field::ProjectId => self.project_id.clone(),
            Field::Tasks => self.tasks.as_ref().map(|t| t.join(", ")),
            Field::OtherNote => self.other_note.clone(),
            Field::CheckinTime => self.checkin_time.map(|t| t.to_rfc3339()),
            Field::Shift => self.shift.clone(),
            Field::Status => self.status.clone(),
            Field::FaceImage => self.face_image.clone(),
        }
    }

    /// Keeps only the projected fields. `EmployeeId` always survives.
    pub fn project(mut self, fields: &[Field]) -> Self {
        let keep = |f: Field| fields.contains(&f);
        if !keep(Field::EmployeeName) {
            self.employee_name = None;
        }
        if !keep(Field::Address) {
            self.address = None;
        }
        if !keep(Field::ProjectId) {
            self.project_id = None;
        }
        if !keep(Field::Tasks) {
            self.tasks = None;
        }
        if !keep(Field::OtherNote) {
            self.other_note = None;
        }
        if !keep(Field::CheckinTime) {
            self.checkin_time = None;
        }
        if !keep(Field::Shift) {
            self.shift = None;
        }
        if !keep(Field::Status) {
            self.status = None;
        }
        if !keep(Field::FaceImage) {
            self.face_image = None;
        }
        self
    }
}
