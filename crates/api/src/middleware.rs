//! Authentication gate for protected admin routes.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::Instrument;
use uuid::Uuid;

use staffdesk_auth::{RequestContext, TokenError, TokenService};
use staffdesk_core::EmployeeId;

use crate::context::CurrentEmployee;

#[derive(Debug, Clone)]
pub struct AuthState {
    pub tokens: TokenService,
    /// Header carrying the raw token.
    pub token_header: HeaderName,
}

/// Verify the request's token and bind its employee to the request.
///
/// Failures short-circuit with a bare `401`. On success the downstream
/// handler runs inside a [`RequestContext`] scope, so the binding is dropped
/// when the request completes regardless of outcome.
pub async fn auth_gate(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
        employee_id = tracing::field::Empty,
    );

    let (employee_id, expires_at) = match authenticate(&state, req.headers()) {
        Ok(accepted) => accepted,
        Err(err) => {
            span.in_scope(|| {
                tracing::warn!(reason = err.kind(), error = %err, "rejecting request");
            });
            return Err(StatusCode::UNAUTHORIZED);
        }
    };
    span.record("employee_id", employee_id.get());
    span.in_scope(|| tracing::debug!(%expires_at, "token accepted"));

    req.extensions_mut().insert(CurrentEmployee::new(employee_id));

    let response = RequestContext::scope(async move {
        if let Err(err) = RequestContext::set(employee_id) {
            tracing::error!(error = %err, "could not bind request identity");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        next.run(req).await
    })
    .instrument(span)
    .await;

    Ok(response)
}

/// The token's subject and the instant it stops being accepted.
fn authenticate(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<(EmployeeId, DateTime<Utc>), TokenError> {
    let token = extract_token(headers, &state.token_header)?;
    let verified = state.tokens.decode(token)?;
    let employee_id = verified
        .claims
        .employee_id()
        .ok_or_else(|| TokenError::Malformed("token does not name an employee".to_string()))?;
    Ok((employee_id, verified.expires_at))
}

fn extract_token<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Result<&'a str, TokenError> {
    let value = headers.get(name).ok_or(TokenError::Missing)?;
    let token = value
        .to_str()
        .map_err(|_| TokenError::Malformed("token header is not ASCII".to_string()))?
        .trim();
    if token.is_empty() {
        return Err(TokenError::Missing);
    }
    Ok(token)
}
