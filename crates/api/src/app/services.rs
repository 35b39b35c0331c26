//! Service wiring and employee use cases.

use std::sync::Arc;

use thiserror::Error;

use staffdesk_auth::{TokenService, hash_password, verify_password};
use staffdesk_core::{AuditStamp, Clock, DomainError, EmployeeId, OperationType};
use staffdesk_employees::{DEFAULT_PASSWORD, Employee, EmployeePatch, EmployeeStatus};
use staffdesk_infra::{
    AuditError, AuditFieldInjector, AuditedRepository, EmployeeQuery, EmployeeRepository,
    InMemoryEmployeeRepository, PageResult, RepoError,
};

use crate::app::dto::EmployeeDto;
use crate::config::AppConfig;

/// Shown in place of the stored password digest.
pub const MASKED_PASSWORD: &str = "****";

pub const ADMIN_ID: i64 = 1;
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("account not found")]
    AccountNotFound,

    #[error("password incorrect")]
    PasswordError,

    #[error("account locked")]
    AccountLocked,

    #[error("employee not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Audit(AuditError),

    #[error("store error: {0}")]
    Store(String),
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateUsername(_) => ServiceError::Conflict(err.to_string()),
            RepoError::NotFound => ServiceError::NotFound,
            RepoError::MissingId => ServiceError::Validation(err.to_string()),
            RepoError::Audit(e) => ServiceError::Audit(e),
            RepoError::Unavailable(msg) => ServiceError::Store(msg),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ServiceError::Validation(msg)
            }
        }
    }
}

/// Everything handlers need, shared via an `Extension`.
pub struct AppServices {
    pub employees: EmployeeService,
    pub tokens: TokenService,
}

pub fn build_services(config: &AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<AppServices> {
    let tokens = TokenService::with_clock(
        config.jwt.admin_secret_key.as_bytes(),
        config.jwt.admin_ttl,
        clock.clone(),
    );

    let injector = AuditFieldInjector::new(clock.clone(), config.audit_policy);
    tracing::info!(policy = ?injector.policy(), "audit stamping configured");
    let store = Arc::new(InMemoryEmployeeRepository::new());
    seed_admin(&store, &injector, clock.as_ref())?;

    let repo: Arc<dyn EmployeeRepository> = Arc::new(AuditedRepository::new(store, injector));

    Ok(AppServices {
        employees: EmployeeService::new(repo),
        tokens,
    })
}

/// Insert the bootstrap administrator (`admin` / default password).
///
/// Runs before any request exists, so the stamp is supplied explicitly.
fn seed_admin(
    store: &InMemoryEmployeeRepository,
    injector: &AuditFieldInjector,
    clock: &dyn Clock,
) -> anyhow::Result<()> {
    let id = EmployeeId::new(ADMIN_ID)?;
    let mut admin = Employee {
        id: Some(id),
        name: "Administrator".to_string(),
        username: ADMIN_USERNAME.to_string(),
        password: hash_password(DEFAULT_PASSWORD),
        phone: String::new(),
        sex: "1".to_string(),
        id_number: String::new(),
        status: EmployeeStatus::Enabled,
        audit: Default::default(),
    };
    injector.inject_with(OperationType::Create, &mut admin, AuditStamp::new(clock.now(), id))?;
    store.insert(admin)?;
    tracing::info!(employee_id = %id, "seeded admin account");
    Ok(())
}

pub struct EmployeeService {
    repo: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(repo: Arc<dyn EmployeeRepository>) -> Self {
        Self { repo }
    }

    /// Check credentials. Unknown account, wrong password and disabled
    /// account are reported in that order.
    pub fn login(&self, username: &str, password: &str) -> Result<Employee, ServiceError> {
        let employee = self
            .repo
            .get_by_username(username)?
            .ok_or(ServiceError::AccountNotFound)?;

        if !verify_password(password, &employee.password) {
            return Err(ServiceError::PasswordError);
        }
        if !employee.is_enabled() {
            return Err(ServiceError::AccountLocked);
        }
        Ok(employee)
    }

    /// Add an employee: enabled, with the default password.
    pub fn save(&self, dto: EmployeeDto) -> Result<Employee, ServiceError> {
        let employee = dto.into_new_employee(hash_password(DEFAULT_PASSWORD));
        employee.validate()?;
        let stored = self.repo.insert(employee)?;
        Ok(masked(stored))
    }

    pub fn page_query(&self, query: &EmployeeQuery) -> Result<PageResult<Employee>, ServiceError> {
        Ok(self.repo.page_query(query)?.map(masked))
    }

    pub fn start_or_stop(&self, status: EmployeeStatus, id: EmployeeId) -> Result<(), ServiceError> {
        self.repo.update(EmployeePatch::for_id(id).with_status(status))?;
        Ok(())
    }

    pub fn get_by_id(&self, id: EmployeeId) -> Result<Employee, ServiceError> {
        let employee = self.repo.get_by_id(id)?.ok_or(ServiceError::NotFound)?;
        Ok(masked(employee))
    }

    pub fn update(&self, dto: EmployeeDto) -> Result<(), ServiceError> {
        let patch = dto.into_patch();
        patch.validate()?;
        self.repo.update(patch)?;
        Ok(())
    }
}

fn masked(mut employee: Employee) -> Employee {
    employee.password = MASKED_PASSWORD.to_string();
    employee
}
