//! Audit attributes carried by persisted records.
//!
//! Records expose their four audit attributes through [`Auditable`]; the
//! persistence layer stamps them from an [`AuditStamp`] according to the
//! declared [`OperationType`] of the write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EmployeeId;

/// Declared intent of a persistence-bound write.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// A new record: all four audit attributes are stamped.
    Create,
    /// A change to an existing record: only `updated_*` is stamped.
    Update,
}

impl core::fmt::Display for OperationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OperationType::Create => f.write_str("CREATE"),
            OperationType::Update => f.write_str("UPDATE"),
        }
    }
}

/// One captured (instant, actor) pair.
///
/// Every attribute stamped during a single write comes from the same stamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub at: DateTime<Utc>,
    pub by: EmployeeId,
}

impl AuditStamp {
    pub fn new(at: DateTime<Utc>, by: EmployeeId) -> Self {
        Self { at, by }
    }
}

/// Created/updated instants and actors of a record.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    pub create_time: Option<DateTime<Utc>>,
    pub create_user: Option<EmployeeId>,
    pub update_time: Option<DateTime<Utc>>,
    pub update_user: Option<EmployeeId>,
}

impl AuditFields {
    /// Stamp the attributes sanctioned by `op`.
    ///
    /// `Create` writes all four from `stamp`; `Update` writes only
    /// `update_time`/`update_user` and leaves the creation pair untouched.
    pub fn stamp(&mut self, op: OperationType, stamp: AuditStamp) {
        if op == OperationType::Create {
            self.create_time = Some(stamp.at);
            self.create_user = Some(stamp.by);
        }
        self.update_time = Some(stamp.at);
        self.update_user = Some(stamp.by);
    }
}

/// A record whose audit attributes can be stamped before it is persisted.
pub trait Auditable {
    /// Mutable access to the audit attributes.
    ///
    /// `None` means this record shape has no audit attributes to stamp.
    fn audit_fields_mut(&mut self) -> Option<&mut AuditFields>;
}

impl Auditable for AuditFields {
    fn audit_fields_mut(&mut self) -> Option<&mut AuditFields> {
        Some(self)
    }
}
