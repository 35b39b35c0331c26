//! Employees domain module.
//!
//! Business rules for employee records, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod employee;

pub use employee::{Employee, EmployeePatch, EmployeeStatus, DEFAULT_PASSWORD};
