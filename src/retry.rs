use std::future::Future;
use std::time::Duration;

/// Run `op` up to `attempts` times, sleeping `backoff` between attempts.
/// `between` runs after each failed attempt (before the backoff sleep) so
/// callers can reset state, e.g. reload a page before retrying navigation.
/// Returns the last error once the attempt budget is exhausted.
pub async fn retry<T, E, Op, Fut, Between, BFut>(
    attempts: u32,
    backoff: Duration,
    mut op: Op,
    mut between: Between,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Between: FnMut() -> BFut,
    BFut: Future<Output = ()>,
    E: std::fmt::Display,
{
    let mut last_err = None;
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(attempt, max = attempts, error = %e, "attempt failed");
                last_err = Some(e);
                if attempt < attempts {
                    between().await;
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
    // attempts >= 1 guarantees last_err is set by the time we get here
    Err(last_err.expect("retry called with zero attempts"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(
            3,
            Duration::from_millis(1),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            },
            || async {},
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(
            3,
            Duration::from_millis(1),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("not yet".to_string())
                    } else {
                        Ok(42)
                    }
                }
            },
            || async {},
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let betweens = AtomicU32::new(0);
        let result: Result<u32, String> = retry(
            3,
            Duration::from_millis(1),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("boom".to_string()) }
            },
            || {
                betweens.fetch_add(1, Ordering::SeqCst);
                async {}
            },
        )
        .await;
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // between hook runs after each failure except the last
        assert_eq!(betweens.load(Ordering::SeqCst), 2);
    }
}
