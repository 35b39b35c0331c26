//! `/admin/employee` endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use staffdesk_auth::Claims;
use staffdesk_core::EmployeeId;
use staffdesk_employees::{Employee, EmployeeStatus};
use staffdesk_infra::PageResult;

use crate::app::dto::{
    ApiResult, EmployeeDto, EmployeeLoginDto, EmployeeLoginVo, EmployeePageQueryDto, IdQuery,
};
use crate::app::services::{AppServices, ServiceError};
use crate::context::CurrentEmployee;

pub fn public_router() -> Router {
    Router::new().route("/admin/employee/login", post(login))
}

pub fn router() -> Router {
    Router::new()
        .route("/admin/employee", post(save).put(update))
        .route("/admin/employee/logout", post(logout))
        .route("/admin/employee/page", get(page))
        .route("/admin/employee/status/:status", post(start_or_stop))
        .route("/admin/employee/:id", get(get_by_id))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<EmployeeLoginDto>,
) -> Result<Json<ApiResult<EmployeeLoginVo>>, ServiceError> {
    let employee = services
        .employees
        .login(&body.username, &body.password)
        .inspect_err(|err| {
            tracing::info!(username = %body.username, reason = %err, "login rejected");
        })?;
    let id = employee
        .id
        .ok_or_else(|| ServiceError::Store("stored employee has no id".to_string()))?;

    let token = services.tokens.issue(&Claims::for_employee(id));
    tracing::info!(employee_id = %id, "employee logged in");

    Ok(Json(ApiResult::success(EmployeeLoginVo {
        id,
        user_name: employee.username,
        name: employee.name,
        token: token.into_string(),
    })))
}

/// Tokens are stateless; logging out is acknowledged and left to the client.
pub async fn logout(Extension(current): Extension<CurrentEmployee>) -> Json<ApiResult<()>> {
    tracing::info!(employee_id = %current.employee_id(), "employee logged out");
    Json(ApiResult::ok())
}

pub async fn save(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentEmployee>,
    Json(body): Json<EmployeeDto>,
) -> Result<Json<ApiResult<Employee>>, ServiceError> {
    let saved = services.employees.save(body)?;
    tracing::info!(
        created_by = %current.employee_id(),
        employee_id = ?saved.id.map(|id| id.get()),
        "employee added"
    );
    Ok(Json(ApiResult::success(saved)))
}

pub async fn page(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<EmployeePageQueryDto>,
) -> Result<Json<ApiResult<PageResult<Employee>>>, ServiceError> {
    let result = services.employees.page_query(&params.into())?;
    Ok(Json(ApiResult::success(result)))
}

pub async fn start_or_stop(
    Extension(services): Extension<Arc<AppServices>>,
    Path(status): Path<i32>,
    Query(IdQuery { id }): Query<IdQuery>,
) -> Result<Json<ApiResult<()>>, ServiceError> {
    let status = EmployeeStatus::try_from(status)?;
    services.employees.start_or_stop(status, id)?;
    tracing::info!(employee_id = %id, status = status.code(), "employee status changed");
    Ok(Json(ApiResult::ok()))
}

pub async fn get_by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResult<Employee>>, ServiceError> {
    let id = EmployeeId::new(id)?;
    Ok(Json(ApiResult::success(services.employees.get_by_id(id)?)))
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<EmployeeDto>,
) -> Result<Json<ApiResult<()>>, ServiceError> {
    let id = body.id;
    services.employees.update(body)?;
    tracing::info!(employee_id = ?id.map(|id| id.get()), "employee updated");
    Ok(Json(ApiResult::ok()))
}
