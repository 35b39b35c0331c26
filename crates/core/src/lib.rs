//! `staffdesk-core`: identifiers, audit fields and the clock shared by every
//! other crate. No I/O lives here.

pub mod audit;
pub mod clock;
pub mod error;
pub mod id;

pub use audit::{AuditFields, AuditStamp, Auditable, OperationType};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::EmployeeId;
