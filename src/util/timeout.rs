//! Per-attempt deadline helper.

use std::future::Future;
use std::time::Duration;

use crate::error::ErrataError;

/// Wrap a future with a timeout.
///
/// A fired deadline becomes [`ErrataError::Timeout`], which classifies as a
/// retryable timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, ErrataError>>,
) -> Result<T, ErrataError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ErrataError::Timeout(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadline_maps_to_timeout_error() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ErrataError::Timeout(50))));
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let result: Result<(), _> = with_timeout(Duration::from_secs(1), async {
            Err(ErrataError::api(500, "boom"))
        })
        .await;
        assert_eq!(result.unwrap_err().status(), Some(500));
    }
}
