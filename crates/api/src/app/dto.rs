//! Request/response DTOs and the JSON envelope.

use serde::{Deserialize, Serialize};

use staffdesk_core::{AuditFields, EmployeeId};
use staffdesk_employees::{Employee, EmployeePatch, EmployeeStatus};
use staffdesk_infra::{EmployeeQuery, Page};

/// Response envelope: `code` is `1` on success and `0` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: i32,
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 1,
            msg: None,
            data: Some(data),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: 0,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

impl ApiResult<()> {
    pub fn ok() -> Self {
        Self {
            code: 1,
            msg: None,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeLoginDto {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeLoginVo {
    pub id: EmployeeId,
    pub user_name: String,
    pub name: String,
    pub token: String,
}

/// Body of add and edit requests. `id` is only meaningful for edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeDto {
    pub id: Option<EmployeeId>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub sex: Option<String>,
    pub id_number: Option<String>,
}

impl EmployeeDto {
    /// A new, enabled, not yet audited record with the given password digest.
    pub fn into_new_employee(self, password: String) -> Employee {
        Employee {
            id: None,
            name: self.name.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            password,
            phone: self.phone.unwrap_or_default(),
            sex: self.sex.unwrap_or_default(),
            id_number: self.id_number.unwrap_or_default(),
            status: EmployeeStatus::Enabled,
            audit: AuditFields::default(),
        }
    }

    pub fn into_patch(self) -> EmployeePatch {
        EmployeePatch {
            id: self.id,
            name: self.name,
            username: self.username,
            phone: self.phone,
            sex: self.sex,
            id_number: self.id_number,
            ..EmployeePatch::default()
        }
    }
}

/// `GET /admin/employee/page` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePageQueryDto {
    pub name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<EmployeePageQueryDto> for EmployeeQuery {
    fn from(dto: EmployeePageQueryDto) -> Self {
        EmployeeQuery {
            name: dto.name,
            page: Page::new(dto.page, dto.page_size),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdQuery {
    pub id: EmployeeId,
}
