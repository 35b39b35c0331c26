use staffdesk_core::EmployeeId;

/// Authenticated employee for a request.
///
/// Inserted into request extensions by the auth gate, next to the task-local
/// [`staffdesk_auth::RequestContext`] binding, for handlers that prefer an
/// explicit extractor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CurrentEmployee {
    employee_id: EmployeeId,
}

impl CurrentEmployee {
    pub fn new(employee_id: EmployeeId) -> Self {
        Self { employee_id }
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }
}
