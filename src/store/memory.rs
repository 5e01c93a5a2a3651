use async_trait::async_trait;

use super::{AttendanceStore, EmployeeDirectory};
use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::DirectoryEntry;
use crate::query::AttendanceQuery;

/// In-memory collections evaluated with the same predicates as the SQL store.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Vec<AttendanceRecord>,
    pub directory: Vec<DirectoryEntry>,
    pub fail: bool,
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find(&self, query: &AttendanceQuery) -> Result<Vec<AttendanceRecord>, StoreError> {
        if self.fail {
            return Err(StoreError::Decode("store offline".into()));
        }

        let mut found: Vec<AttendanceRecord> = self
            .records
            .iter()
            .filter(|r| query.filter.matches(r))
            .cloned()
            .map(|r| r.project(query.projection.fields()))
            .collect();

        found.sort_by(|a, b| b.checkin_time.cmp(&a.checkin_time));

        Ok(found)
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn find_by_employee_id(
        &self,
        employee_id: &str,
    ) -> Result<Option<DirectoryEntry>, StoreError> {
        if self.fail {
            return Err(StoreError::Decode("directory offline".into()));
        }

        Ok(self
            .directory
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }
}
