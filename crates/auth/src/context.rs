//! Request-scoped identity.
//!
//! Each logical request runs inside [`RequestContext::scope`] (async) or
//! [`RequestContext::sync_scope`] (plain worker threads). The binding lives in
//! Tokio task-local storage, so it is visible to everything polled inside the
//! scope and to nothing else, and it is torn down when the scope exits on any
//! path, including panics. A worker that is reused for the next request starts
//! from an empty binding.

use std::cell::Cell;
use std::future::Future;

use thiserror::Error;
use tokio::task_local;

use staffdesk_core::EmployeeId;

task_local! {
    static CURRENT_EMPLOYEE: Cell<Option<EmployeeId>>;
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("no request scope is active")]
    NoActiveRequest,
}

/// Accessors for the identity bound to the current logical request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext;

impl RequestContext {
    /// Run `fut` as one logical request with an initially empty binding.
    pub async fn scope<F>(fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_EMPLOYEE.scope(Cell::new(None), fut).await
    }

    /// Synchronous counterpart of [`RequestContext::scope`].
    pub fn sync_scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT_EMPLOYEE.sync_scope(Cell::new(None), f)
    }

    /// Bind `id` to the current request, replacing any earlier binding.
    pub fn set(id: EmployeeId) -> Result<(), ContextError> {
        let previous = CURRENT_EMPLOYEE
            .try_with(|slot| slot.replace(Some(id)))
            .map_err(|_| ContextError::NoActiveRequest)?;
        if let Some(previous) = previous {
            tracing::warn!(%previous, current = %id, "request identity bound twice");
        }
        Ok(())
    }

    /// The bound identity; `None` before authentication, after [`clear`](Self::clear),
    /// or outside any request scope.
    pub fn get() -> Option<EmployeeId> {
        CURRENT_EMPLOYEE.try_with(Cell::get).ok().flatten()
    }

    /// Remove the binding. No-op outside a scope.
    pub fn clear() {
        let _ = CURRENT_EMPLOYEE.try_with(|slot| slot.set(None));
    }
}
