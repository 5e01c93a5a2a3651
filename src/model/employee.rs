use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Entry of the employee index collection consulted by the directory lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DirectoryEntry {
    pub employee_id: String,
    pub employee_name: Option<String>,
}
