use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use sqlx::{MySqlPool, Row, mysql::MySqlRow};
use tracing::{debug, error};

use super::{AttendanceStore, EmployeeDirectory};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, Field};
use crate::model::employee::DirectoryEntry;
use crate::query::AttendanceQuery;
use crate::query::filter::{AttendanceFilter, Predicate};

const ATTENDANCE_TABLE: &str = "hr_gps_attendance";
const DIRECTORY_TABLE: &str = "hr_employee_index";

/// SQL bindable value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    DateTime(DateTime<Utc>),
}

/// SELECT statement with its positional bindings
#[derive(Debug)]
pub struct SqlSelect {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Record store and directory backed by MySQL.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Build the SELECT for an attendance query.
pub fn build_select(query: &AttendanceQuery) -> SqlSelect {
    let columns = query
        .projection
        .fields()
        .iter()
        .map(|f| f.column())
        .collect::<Vec<_>>()
        .join(", ");

    let mut values = Vec::new();
    let where_clause = render_filter(&query.filter, &mut values);

    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY checkin_time DESC",
        columns, ATTENDANCE_TABLE, where_clause
    );

    SqlSelect { sql, values }
}

fn render_filter(filter: &AttendanceFilter, values: &mut Vec<SqlValue>) -> String {
    if filter.is_empty() {
        return String::new();
    }

    let conditions = filter
        .clauses
        .iter()
        .map(|p| render_predicate(p, values))
        .collect::<Vec<_>>();

    format!(" WHERE {}", conditions.join(" AND "))
}

fn render_predicate(predicate: &Predicate, values: &mut Vec<SqlValue>) -> String {
    match predicate {
        Predicate::Between { field, start, end } => {
            values.push(SqlValue::DateTime(*start));
            values.push(SqlValue::DateTime(*end));
            format!("{} BETWEEN ? AND ?", field.column())
        }
        Predicate::Contains { field, needle } => {
            values.push(SqlValue::String(format!(
                "%{}%",
                escape_like(&needle.to_lowercase())
            )));
            format!("LOWER({}) LIKE ?", field.column())
        }
        Predicate::Any(inner) => {
            let parts = inner
                .iter()
                .map(|p| render_predicate(p, values))
                .collect::<Vec<_>>();
            format!("({})", parts.join(" OR "))
        }
    }
}

/// Literal match for `%`, `_` and `\` inside a LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn record_from_row(row: &MySqlRow, fields: &[Field]) -> Result<AttendanceRecord, sqlx::Error> {
    let mut record = AttendanceRecord {
        employee_id: row.try_get("employee_id")?,
        ..Default::default()
    };

    for field in fields {
        let column = field.column();
        match field {
            Field::EmployeeId => {}
            Field::EmployeeName => record.employee_name = row.try_get(column)?,
            Field::Address => record.address = row.try_get(column)?,
            Field::ProjectId => record.project_id = row.try_get(column)?,
            Field::Tasks => {
                let raw: Option<String> = row.try_get(column)?;
                record.tasks = raw.map(|s| decode_tasks(&s));
            }
            Field::OtherNote => record.other_note = row.try_get(column)?,
            Field::CheckinTime => record.checkin_time = row.try_get(column)?,
            Field::Shift => record.shift = row.try_get(column)?,
            Field::Status => record.status = row.try_get(column)?,
            Field::FaceImage => record.face_image = row.try_get(column)?,
        }
    }

    Ok(record)
}

/// Tasks are stored as a JSON array; older rows hold a plain string.
fn decode_tasks(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tasks) => tasks,
        Err(_) if raw.trim().is_empty() => Vec::new(),
        Err(_) => vec![raw.to_string()],
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find(&self, query: &AttendanceQuery) -> Result<Vec<AttendanceRecord>, StoreError> {
        let select = build_select(query);
        debug!(sql = %select.sql, bindings = ?select.values, "Fetching attendances");

        let mut q = sqlx::query(&select.sql);
        for value in select.values {
            q = match value {
                SqlValue::String(v) => q.bind(v),
                SqlValue::DateTime(v) => q.bind(v),
            };
        }

        let rows: Vec<MySqlRow> = q.fetch(&self.pool).try_collect().await.map_err(|e| {
            error!(error = %e, sql = %select.sql, "Failed to fetch attendances");
            StoreError::from(e)
        })?;

        rows.iter()
            .map(|row| record_from_row(row, query.projection.fields()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!(error = %e, "Failed to decode attendance row");
                StoreError::Decode(e.to_string())
            })
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn find_by_employee_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<DirectoryEntry>, StoreError> {
        let sql = format!(
            "SELECT employee_id, employee_name FROM {} WHERE employee_id = ? LIMIT 1",
            DIRECTORY_TABLE
        );

        sqlx::query_as::<_, DirectoryEntry>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, "Directory lookup failed");
                StoreError::from(e)
            })
    }
}
