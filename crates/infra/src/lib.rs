//! Infrastructure layer: persistence adapters and the write-path audit stamping.

pub mod audit;
pub mod employees;
pub mod pagination;

pub use audit::{AuditError, AuditFieldInjector, AuditPolicy};
pub use employees::{
    AuditedRepository, EmployeeQuery, EmployeeRepository, InMemoryEmployeeRepository, RepoError,
};
pub use pagination::{Page, PageResult};
