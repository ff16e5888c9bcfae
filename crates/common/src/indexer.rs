use std::{future::Future, time::Duration};

use tokio::time::sleep;

pub const MAX_RETRIES: u32 = 5;
pub const RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Retries `operation` up to `max_retries` extra times, sleeping `delay` between attempts.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    delay: Duration,
    mut operation: F,
) -> eyre::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= max_retries {
                    return Err(e);
                }
                attempt += 1;
                tracing::warn!(attempt, error = %e, "Operation failed, retrying in {:?}", delay);
                sleep(delay).await;
            }
        }
    }
}
