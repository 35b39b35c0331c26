//! Employee persistence: the repository contract, an in-memory store, and the
//! audited decorator that stamps writes before they reach a store.

pub mod audited;
pub mod in_memory;
pub mod repository;

pub use audited::AuditedRepository;
pub use in_memory::InMemoryEmployeeRepository;
pub use repository::{EmployeeQuery, EmployeeRepository, RepoError};
