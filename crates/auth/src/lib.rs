//! `staffdesk-auth`: token issuance/verification and per-request identity.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod context;
pub mod password;
pub mod token;

pub use claims::{Claims, EMP_ID_CLAIM, is_reserved_claim};
pub use context::{ContextError, RequestContext};
pub use password::{hash_password, verify_password};
pub use token::{Token, TokenError, TokenService, VerifiedToken};
