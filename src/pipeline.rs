use error_stack::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analysis::{AnalysisBatch, Analyzer, TickerOutcome};
use crate::error::SeriesError;
use crate::model::Ticker;
use crate::series::SeriesStore;
use crate::supplier::BarSupplier;

const CANCELLED: &str = "analysis cancelled";

/// Fetch, validate and analyze every ticker in order.
///
/// A failure for one ticker never stops the run; it becomes a `Failed`
/// outcome. Once `cancel` fires, the remaining tickers are recorded as
/// cancelled without being fetched.
pub async fn run_batch(
    supplier: &dyn BarSupplier,
    analyzer: &Analyzer,
    tickers: &[Ticker],
    cancel: &CancellationToken,
) -> AnalysisBatch {
    let lookback = analyzer.lookback();
    let mut store = SeriesStore::new();
    let mut batch = AnalysisBatch::new();

    info!(
        run_id = %batch.run_id,
        supplier = supplier.name(),
        tickers = tickers.len(),
        lookback,
        "analysis run started"
    );

    for ticker in tickers {
        if cancel.is_cancelled() {
            batch.push(cancelled(ticker));
            continue;
        }

        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                warn!(symbol = %ticker.symbol, "fetch interrupted by cancellation");
                batch.push(cancelled(ticker));
                continue;
            }
            fetched = supplier.fetch_daily_bars(&ticker.symbol, lookback) => fetched,
        };

        let bars = match fetched {
            Ok(rows) => {
                let rejected = store.insert(&ticker.symbol, &rows);
                info!(
                    symbol = %ticker.symbol,
                    rows = rows.len(),
                    rejected = rejected.len(),
                    "daily bars stored"
                );
                store.recent(&ticker.symbol, lookback)
            }
            Err(report) => Err(report).change_context(SeriesError::DataUnavailable {
                symbol: ticker.symbol.clone(),
            }),
        };

        batch.push(analyzer.outcome(ticker, bars));
    }

    info!(
        run_id = %batch.run_id,
        analyzed = batch.records().len(),
        failed = batch.failures().count(),
        "analysis run complete"
    );
    batch
}

fn cancelled(ticker: &Ticker) -> TickerOutcome {
    TickerOutcome::Failed {
        ticker: ticker.clone(),
        error: CANCELLED.to_owned(),
    }
}
