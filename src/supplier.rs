pub mod file;
pub mod throttle;
pub mod yahoo;

use std::path::PathBuf;
use std::time::Duration;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::config::SupplierConfig;
use crate::error::SupplierError;
use crate::model::RawBar;

use file::FileSupplier;
use throttle::Throttled;
use yahoo::YahooSupplier;

/// Source of daily bars for a ticker.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn BarSupplier`).
pub trait BarSupplier: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch daily rows covering at least the `lookback` most recent sessions,
    /// oldest first.
    ///
    /// Rows are returned untrimmed: validation may drop some, and the store
    /// applies the lookback afterwards. An empty vector is a valid answer;
    /// the caller treats it as no data.
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> BoxFuture<'_, Result<Vec<RawBar>, Report<SupplierError>>>;
}

/// Build the configured supplier, wrapped in a throttle when a request delay is set.
pub fn build_supplier(
    config: &SupplierConfig,
) -> Result<Box<dyn BarSupplier>, Report<SupplierError>> {
    let supplier: Box<dyn BarSupplier> = match config.kind.as_str() {
        "file" => Box::new(FileSupplier::new(PathBuf::from(&config.data_dir))),
        _ => Box::new(YahooSupplier::new(
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?),
    };

    let delay = config.request_delay();
    if delay.is_zero() {
        return Ok(supplier);
    }
    tracing::info!(supplier = supplier.name(), delay_ms = config.request_delay_ms, "throttling supplier requests");
    Ok(Box::new(Throttled::new(supplier, delay)))
}
