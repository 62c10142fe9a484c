use tracing::{info, warn};

use crate::analysis::AnalysisBatch;
use crate::indicator::rsi::RsiZone;
use crate::ranking::{Summary, best_performers, momentum_ranking};
use crate::report::{Reporter, insights};

/// Emits the run as `tracing` events, one per table row.
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn report(&self, batch: &AnalysisBatch, summary: &Summary<'_>) {
        let records = batch.records();
        let horizon = summary.horizon;

        if batch.is_empty() {
            warn!(run_id = %batch.run_id, "analysis batch has no tickers");
            return;
        }
        info!(run_id = %batch.run_id, generated_at = %batch.generated_at, tickers = batch.len(), "analysis report");

        for (rank, r) in best_performers(&records, horizon).iter().enumerate() {
            info!(rank = rank + 1, symbol = r.symbol, name = r.name, change_pct = r.value, horizon, "performance");
        }

        for record in &records {
            let rsi = record.indicators.rsi;
            info!(
                symbol = record.symbol(),
                as_of = %record.as_of_date,
                close = record.current.close,
                trend = %record.trend.label,
                strength = record.trend.strength_score,
                above = record.trend.above_count,
                total = record.trend.total_count,
                rsi = ?rsi,
                rsi_zone = ?rsi.map(RsiZone::of),
                volatility_pct = ?record.indicators.volatility_pct,
                avg_volume = ?record.indicators.avg_volume,
                high = ?record.indicators.range.high,
                low = ?record.indicators.range.low,
                "trend"
            );
            for (name, value) in record.indicators.entries() {
                info!(symbol = record.symbol(), indicator = %name, value = ?value, "indicator");
            }
            for (horizon, change) in record.price_changes.iter() {
                info!(symbol = record.symbol(), horizon, change_pct = ?change, "price change");
            }
        }

        for (rank, r) in momentum_ranking(&records).iter().enumerate() {
            info!(rank = rank + 1, symbol = r.symbol, momentum = r.value, "momentum");
        }

        for line in insights(summary) {
            info!("insight: {line}");
        }

        for (ticker, error) in batch.failures() {
            warn!(symbol = %ticker.symbol, name = %ticker.name, error, "not analyzed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, TickerOutcome};
    use crate::config::AnalysisConfig;
    use crate::indicator::test_support::bars_from_closes;
    use crate::model::Ticker;
    use crate::ranking::summarize;

    #[test]
    fn terminal_reporter_does_not_panic() {
        let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
        let closes: Vec<f64> = (0..260).map(|i| 100.0 + (i % 17) as f64).collect();
        let bars = bars_from_closes(&closes);

        let mut batch = AnalysisBatch::new();
        batch.push(analyzer.outcome(&Ticker::new("GOOGL", "Google (Alphabet)"), Ok(&bars)));
        batch.push(analyzer.outcome(&Ticker::new("UBER", "Uber"), Ok(&bars[..5])));
        batch.push(TickerOutcome::Failed {
            ticker: Ticker::new("META", "Meta"),
            error: "data unavailable for META".into(),
        });

        let records = batch.records();
        let summary = summarize(&records, 30);
        // Should not panic
        TerminalReporter.report(&batch, &summary);
    }

    #[test]
    fn empty_batch_reports_nothing() {
        let batch = AnalysisBatch::new();
        assert!(batch.is_empty());
        TerminalReporter.report(&batch, &summarize(&[], 30));
    }
}
