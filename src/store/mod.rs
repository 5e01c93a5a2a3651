//! Collaborators the handlers read from: the attendance record store and the
//! employee directory. Timestamps cross this boundary as UTC instants.

pub mod mysql;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::DirectoryEntry;
use crate::query::AttendanceQuery;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Records matching the query's filter, reduced to its projection.
    async fn find(&self, query: &AttendanceQuery) -> Result<Vec<AttendanceRecord>, StoreError>;
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_by_employee_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<DirectoryEntry>, StoreError>;
}
