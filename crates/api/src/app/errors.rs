use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::app::dto::ApiResult;
use crate::app::services::ServiceError;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::AccountNotFound | ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::PasswordError | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::AccountLocked => StatusCode::LOCKED,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Audit(_) | ServiceError::Store(_) => {
                tracing::error!(error = %self, "request failed");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, "unknown error");
            }
        };
        json_error(status, self.to_string())
    }
}

pub fn json_error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, axum::Json(ApiResult::<()>::error(msg))).into_response()
}
