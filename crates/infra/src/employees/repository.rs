use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use staffdesk_core::EmployeeId;
use staffdesk_employees::{Employee, EmployeePatch};

use crate::audit::AuditError;
use crate::pagination::{Page, PageResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("{0} already exists")]
    DuplicateUsername(String),

    #[error("employee not found")]
    NotFound,

    #[error("employee id is required")]
    MissingId,

    #[error("audit stamping failed: {0}")]
    Audit(#[from] AuditError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Filter + page for listing employees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeQuery {
    /// Case-insensitive substring of the display name.
    pub name: Option<String>,
    pub page: Page,
}

/// Storage contract for employee records.
pub trait EmployeeRepository: Send + Sync {
    fn get_by_username(&self, username: &str) -> Result<Option<Employee>, RepoError>;

    fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, RepoError>;

    /// Persist a new record; the store assigns `id` when absent.
    /// Usernames are unique.
    fn insert(&self, employee: Employee) -> Result<Employee, RepoError>;

    /// Apply a partial update to the record named by `patch.id`.
    fn update(&self, patch: EmployeePatch) -> Result<(), RepoError>;

    /// Newest-created first.
    fn page_query(&self, query: &EmployeeQuery) -> Result<PageResult<Employee>, RepoError>;
}

impl<S> EmployeeRepository for Arc<S>
where
    S: EmployeeRepository + ?Sized,
{
    fn get_by_username(&self, username: &str) -> Result<Option<Employee>, RepoError> {
        (**self).get_by_username(username)
    }

    fn get_by_id(&self, id: EmployeeId) -> Result<Option<Employee>, RepoError> {
        (**self).get_by_id(id)
    }

    fn insert(&self, employee: Employee) -> Result<Employee, RepoError> {
        (**self).insert(employee)
    }

    fn update(&self, patch: EmployeePatch) -> Result<(), RepoError> {
        (**self).update(patch)
    }

    fn page_query(&self, query: &EmployeeQuery) -> Result<PageResult<Employee>, RepoError> {
        (**self).page_query(query)
    }
}
