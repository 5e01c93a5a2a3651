use std::sync::Arc;

use crate::auth::gate::AccessPolicy;
use crate::auth::session::SessionStore;
use crate::query::QueryBuilder;
use crate::store::{AttendanceStore, EmployeeDirectory};

/// Shared per-process context handed to every handler.
pub struct AppState {
    pub store: Arc<dyn AttendanceStore>,
    pub directory: Arc<dyn EmployeeDirectory>,
    pub policy: AccessPolicy,
    pub sessions: SessionStore,
    pub builder: QueryBuilder,
    pub export_prefix: String,
}
