use std::collections::HashSet;

use derive_more::Display;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::EmployeeDirectory;

/// Who may read attendance data.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allow_list: HashSet<String>,
    require_directory: bool,
}

impl AccessPolicy {
    pub fn new<I, S>(allowed: I, require_directory: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_list: allowed
                .into_iter()
                .map(Into::into)
                .map(|id: String| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            require_directory,
        }
    }

    pub fn permits(&self, employee_id: &str) -> bool {
        self.allow_list.contains(employee_id)
    }

    pub fn requires_directory(&self) -> bool {
        self.require_directory
    }

    pub fn allowed_count(&self) -> usize {
        self.allow_list.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AccessReason {
    #[display(fmt = "granted")]
    Granted,
    #[display(fmt = "missing identifier")]
    MissingIdentifier,
    #[display(fmt = "unknown identifier")]
    UnknownIdentifier,
    #[display(fmt = "not permitted")]
    NotPermitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub granted: bool,
    pub employee_id: Option<String>,
    pub reason: AccessReason,
    /// Filled when the directory was consulted and knows the name.
    pub employee_name: Option<String>,
}

impl AccessDecision {
    fn deny(employee_id: Option<String>, reason: AccessReason) -> Self {
        Self {
            granted: false,
            employee_id,
            reason,
            employee_name: None,
        }
    }
}

/// Decide whether `candidate` may read attendance data.
///
/// Checks run in order: presence, directory membership (only when the policy
/// asks for it), allow-list membership.
pub async fn authorize(
    candidate: Option<&str>,
    policy: &AccessPolicy,
    directory: &dyn EmployeeDirectory,
) -> Result<AccessDecision, StoreError> {
    let Some(employee_id) = candidate.map(str::trim).filter(|s| !s.is_empty()) else {
        debug!("Access denied: no employee id supplied");
        return Ok(AccessDecision::deny(None, AccessReason::MissingIdentifier));
    };

    let mut employee_name = None;
    if policy.requires_directory() {
        match directory.find_by_employee_id(employee_id).await? {
            Some(entry) => employee_name = entry.employee_name,
            None => {
                info!(employee_id, "Access denied: not in employee directory");
                return Ok(AccessDecision::deny(
                    Some(employee_id.to_string()),
                    AccessReason::UnknownIdentifier,
                ));
            }
        }
    }

    if !policy.permits(employee_id) {
        info!(employee_id, "Access denied: not in allow-list");
        return Ok(AccessDecision::deny(
            Some(employee_id.to_string()),
            AccessReason::NotPermitted,
        ));
    }

    Ok(AccessDecision {
        granted: true,
        employee_id: Some(employee_id.to_string()),
        reason: AccessReason::Granted,
        employee_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::DirectoryEntry;
    use crate::store::memory::MemoryStore;

    fn directory() -> MemoryStore {
        MemoryStore {
            directory: vec![
                DirectoryEntry {
                    employee_id: "A001".into(),
                    employee_name: Some("Nguyen Van A".into()),
                },
                DirectoryEntry {
                    employee_id: "X999".into(),
                    employee_name: None,
                },
            ],
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn missing_identifier_is_denied() {
        let policy = AccessPolicy::new(["A001"], false);
        for candidate in [None, Some(""), Some("   ")] {
            let decision = authorize(candidate, &policy, &directory()).await.unwrap();
            assert!(!decision.granted);
            assert_eq!(decision.reason, AccessReason::MissingIdentifier);
            assert_eq!(decision.reason.to_string(), "missing identifier");
        }
    }

    #[actix_web::test]
    async fn identifier_outside_allow_list_is_not_permitted() {
        let policy = AccessPolicy::new(["A001"], false);
        let decision = authorize(Some("X999"), &policy, &directory()).await.unwrap();
        assert!(!decision.granted);
        assert_eq!(decision.reason, AccessReason::NotPermitted);
        assert_eq!(decision.employee_id.as_deref(), Some("X999"));
    }

    #[actix_web::test]
    async fn allow_listed_identifier_is_granted() {
        let policy = AccessPolicy::new(["A001", "B002"], false);
        let decision = authorize(Some(" A001 "), &policy, &directory()).await.unwrap();
        assert!(decision.granted);
        assert_eq!(decision.reason, AccessReason::Granted);
        assert_eq!(decision.employee_id.as_deref(), Some("A001"));
        // Directory is not consulted when the policy does not require it.
        assert_eq!(decision.employee_name, None);
    }

    #[actix_web::test]
    async fn directory_check_runs_before_allow_list() {
        let policy = AccessPolicy::new(["A001", "B002"], true);

        let unknown = authorize(Some("B002"), &policy, &directory()).await.unwrap();
        assert_eq!(unknown.reason, AccessReason::UnknownIdentifier);

        let known = authorize(Some("A001"), &policy, &directory()).await.unwrap();
        assert!(known.granted);
        assert_eq!(known.employee_name.as_deref(), Some("Nguyen Van A"));

        let listed_nowhere = authorize(Some("X999"), &policy, &directory()).await.unwrap();
        assert_eq!(listed_nowhere.reason, AccessReason::NotPermitted);
    }

    #[actix_web::test]
    async fn directory_failure_is_a_store_error() {
        let policy = AccessPolicy::new(["A001"], true);
        let failing = MemoryStore {
            fail: true,
            ..Default::default()
        };
        assert!(authorize(Some("A001"), &policy, &failing).await.is_err());
    }

    #[test]
    fn policy_ignores_blank_entries() {
        let policy = AccessPolicy::new(["A001", " ", "B002 "], false);
        assert_eq!(policy.allowed_count(), 2);
        assert!(policy.permits("B002"));
    }
}
