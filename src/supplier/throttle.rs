use std::time::Duration;

use error_stack::Report;
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::error::SupplierError;
use crate::model::RawBar;
use crate::supplier::BarSupplier;

/// Spaces calls to the inner supplier at least `delay` apart.
pub struct Throttled {
    inner: Box<dyn BarSupplier>,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl Throttled {
    pub fn new(inner: Box<dyn BarSupplier>, delay: Duration) -> Self {
        // burst of one: every request after the first waits a full period
        let rate_limiter = Quota::with_period(delay).map(RateLimiter::direct);
        Self {
            inner,
            rate_limiter,
        }
    }
}

impl BarSupplier for Throttled {
    fn name(&self) -> &str {
        "throttled"
    }

    fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> BoxFuture<'_, Result<Vec<RawBar>, Report<SupplierError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }
            tracing::debug!(supplier = self.inner.name(), symbol = %symbol, "request slot acquired");
            self.inner.fetch_daily_bars(&symbol, lookback).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    struct Counting(AtomicUsize);

    impl BarSupplier for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch_daily_bars(
            &self,
            _symbol: &str,
            _lookback: usize,
        ) -> BoxFuture<'_, Result<Vec<RawBar>, Report<SupplierError>>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    #[tokio::test]
    async fn requests_are_spaced_by_delay() {
        let throttled = Throttled::new(
            Box::new(Counting(AtomicUsize::new(0))),
            Duration::from_millis(100),
        );
        let started = Instant::now();
        for symbol in ["AAPL", "MSFT", "NVDA"] {
            throttled.fetch_daily_bars(symbol, 10).await.unwrap();
        }
        // first call is immediate, the next two each wait one period
        assert!(started.elapsed() >= Duration::from_millis(190));
    }

    #[tokio::test]
    async fn zero_delay_does_not_wait() {
        let throttled = Throttled::new(Box::new(Counting(AtomicUsize::new(0))), Duration::ZERO);
        assert!(throttled.rate_limiter.is_none());
        let started = Instant::now();
        for _ in 0..5 {
            throttled.fetch_daily_bars("AAPL", 10).await.unwrap();
        }
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
