use std::{future::Future, time::Duration};

use portal_core::{PortalError, UserStoreError};

/// Limit applied to store calls when the caller configures none.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

fn log_elapsed(limit: Duration, operation: &str) {
    let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
    tracing::error!(operation, timeout_ms, "Operation timed out");
}

/// Bound a store or identity-provider call. Elapsed calls are reported as
/// internal errors and never retried.
pub async fn bounded<F, T, E>(limit: Duration, operation: &str, fut: F) -> Result<T, PortalError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<PortalError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            log_elapsed(limit, operation);
            Err(PortalError::Internal(format!("{operation} timed out")))
        }
    }
}

/// [`bounded`] for callers that keep the user store's error type. An elapsed
/// call becomes `UnexpectedError`.
pub async fn bounded_user_store<F, T>(
    limit: Duration,
    operation: &str,
    fut: F,
) -> Result<T, UserStoreError>
where
    F: Future<Output = Result<T, UserStoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            log_elapsed(limit, operation);
            Err(UserStoreError::UnexpectedError(format!("{operation} timed out")))
        }
    }
}
