use serde::{Deserialize, Serialize};

use staffdesk_core::{AuditFields, Auditable, DomainError, DomainResult, EmployeeId};

/// Initial password given to newly added employees.
pub const DEFAULT_PASSWORD: &str = "123456";

/// Account status. Serialized as `1` (enabled) / `0` (disabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "i32", into = "i32")]
pub enum EmployeeStatus {
    #[default]
    Enabled,
    Disabled,
}

impl EmployeeStatus {
    pub fn code(self) -> i32 {
        match self {
            EmployeeStatus::Enabled => 1,
            EmployeeStatus::Disabled => 0,
        }
    }
}

impl TryFrom<i32> for EmployeeStatus {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EmployeeStatus::Enabled),
            0 => Ok(EmployeeStatus::Disabled),
            other => Err(DomainError::validation(format!(
                "status must be 0 or 1, got {other}"
            ))),
        }
    }
}

impl From<EmployeeStatus> for i32 {
    fn from(value: EmployeeStatus) -> Self {
        value.code()
    }
}

/// A staff account as persisted.
///
/// `id` is `None` until the store assigns one on insert. `password` holds the
/// stored digest, never the plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Option<EmployeeId>,
    pub name: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub sex: String,
    pub id_number: String,
    pub status: EmployeeStatus,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Employee {
    /// Check the fields a new record must carry.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        validate_username(&self.username)?;
        if self.password.is_empty() {
            return Err(DomainError::validation("password must not be empty"));
        }
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.status == EmployeeStatus::Enabled
    }

    /// Overwrite every field the patch carries.
    pub fn apply(&mut self, patch: &EmployeePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(username) = &patch.username {
            self.username = username.clone();
        }
        if let Some(password) = &patch.password {
            self.password = password.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(sex) = &patch.sex {
            self.sex = sex.clone();
        }
        if let Some(id_number) = &patch.id_number {
            self.id_number = id_number.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }

        let stamped = &patch.audit;
        if stamped.create_time.is_some() {
            self.audit.create_time = stamped.create_time;
        }
        if stamped.create_user.is_some() {
            self.audit.create_user = stamped.create_user;
        }
        if stamped.update_time.is_some() {
            self.audit.update_time = stamped.update_time;
        }
        if stamped.update_user.is_some() {
            self.audit.update_user = stamped.update_user;
        }
    }
}

impl Auditable for Employee {
    fn audit_fields_mut(&mut self) -> Option<&mut AuditFields> {
        Some(&mut self.audit)
    }
}

/// A partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub id: Option<EmployeeId>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub sex: Option<String>,
    pub id_number: Option<String>,
    pub status: Option<EmployeeStatus>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl EmployeePatch {
    pub fn for_id(id: EmployeeId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: EmployeeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.is_none() {
            return Err(DomainError::validation("id is required for an update"));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name must not be empty"));
            }
        }
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        Ok(())
    }
}

impl Auditable for EmployeePatch {
    fn audit_fields_mut(&mut self) -> Option<&mut AuditFields> {
        Some(&mut self.audit)
    }
}

fn validate_username(username: &str) -> DomainResult<()> {
    if username.trim().is_empty() {
        return Err(DomainError::validation("username must not be empty"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("username must not contain whitespace"));
    }
    Ok(())
}
