//! Bounded exponential backoff for idempotent external calls.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::util::errors::{TripMeshError, TripMeshResult};

/// Runs `op` up to `attempts` times, doubling the delay between tries.
/// Only use for idempotent calls (classification, search); non-idempotent
/// calls surface their first failure instead.
pub async fn retry_with_backoff<T, F, Fut>(
    label: &str,
    attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> TripMeshResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TripMeshResult<T>>,
{
    let mut delay = base_delay;
    let mut last_err = TripMeshError::ExternalService(format!("{}: no attempts made", label));

    for attempt in 1..=attempts.max(1) {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(
                    "External call failed: label={}, attempt={}/{}, error={}",
                    label, attempt, attempts, e
                );
                last_err = e;
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
            }
        }
    }

    Err(last_err)
}
