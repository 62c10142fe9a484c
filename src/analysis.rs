use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use error_stack::{Report, ResultExt, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::error::{IndicatorError, SeriesError};
use crate::indicator::change::PriceChangeSet;
use crate::indicator::{IndicatorEngine, IndicatorSet};
use crate::model::{OhlcvBar, Ticker};
use crate::momentum::MomentumScorer;
use crate::trend::{TrendAssessment, classify};

/// Everything derived for one ticker in one run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub ticker: Ticker,
    pub as_of_date: NaiveDate,
    pub current: OhlcvBar,
    pub indicators: IndicatorSet,
    pub price_changes: PriceChangeSet,
    pub trend: TrendAssessment,
    pub momentum_score: f64,
}

impl AnalysisRecord {
    pub fn symbol(&self) -> &str {
        &self.ticker.symbol
    }

    pub fn change(&self, horizon: usize) -> Option<f64> {
        self.price_changes.get(horizon)
    }
}

/// One entry per requested ticker: a record, or why there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    Analyzed(AnalysisRecord),
    Failed { ticker: Ticker, error: String },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &Ticker {
        match self {
            Self::Analyzed(record) => &record.ticker,
            Self::Failed { ticker, .. } => ticker,
        }
    }

    pub fn record(&self) -> Option<&AnalysisRecord> {
        match self {
            Self::Analyzed(record) => Some(record),
            Self::Failed { .. } => None,
        }
    }
}

/// The result of one analysis run, keyed by ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBatch {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub outcomes: BTreeMap<String, TickerOutcome>,
}

impl AnalysisBatch {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            outcomes: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, outcome: TickerOutcome) {
        self.outcomes
            .insert(outcome.ticker().symbol.clone(), outcome);
    }

    /// Successfully analyzed records in symbol order.
    pub fn records(&self) -> Vec<&AnalysisRecord> {
        self.outcomes.values().filter_map(TickerOutcome::record).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Ticker, &str)> {
        self.outcomes.values().filter_map(|o| match o {
            TickerOutcome::Failed { ticker, error } => Some((ticker, error.as_str())),
            TickerOutcome::Analyzed(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Default for AnalysisBatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs indicators, trend classification and momentum scoring over one series.
pub struct Analyzer {
    engine: IndicatorEngine,
    scorer: MomentumScorer,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            engine: IndicatorEngine::new(config)?,
            scorer: MomentumScorer::new(config.momentum_weights.clone()),
        })
    }

    /// Bars to request from the store so every indicator can be defined.
    pub fn lookback(&self) -> usize {
        self.engine.required_bars()
    }

    pub fn analyze(
        &self,
        ticker: &Ticker,
        bars: &[OhlcvBar],
    ) -> Result<AnalysisRecord, Report<SeriesError>> {
        let Some(current) = bars.last() else {
            bail!(SeriesError::DataUnavailable {
                symbol: ticker.symbol.clone(),
            });
        };

        let indicators = self.engine.indicators(bars);
        let price_changes = self.engine.price_changes(bars);
        let trend = classify(current.close, indicators.defined_moving_averages());
        let momentum_score = self.scorer.score(&price_changes);

        tracing::debug!(
            symbol = %ticker.symbol,
            bars = bars.len(),
            trend = %trend.label,
            momentum_score,
            "ticker analyzed"
        );

        Ok(AnalysisRecord {
            ticker: ticker.clone(),
            as_of_date: current.date,
            current: current.clone(),
            indicators,
            price_changes,
            trend,
            momentum_score,
        })
    }

    /// Analyze and fold any failure into a `Failed` outcome.
    pub fn outcome(
        &self,
        ticker: &Ticker,
        bars: Result<&[OhlcvBar], Report<SeriesError>>,
    ) -> TickerOutcome {
        let analyzed = bars
            .and_then(|b| self.analyze(ticker, b))
            .attach_with(|| format!("ticker: {ticker}"));
        match analyzed {
            Ok(record) => TickerOutcome::Analyzed(record),
            Err(report) => {
                tracing::warn!(symbol = %ticker.symbol, error = ?report, "ticker analysis failed");
                TickerOutcome::Failed {
                    ticker: ticker.clone(),
                    error: report.current_context().to_string(),
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::bars_from_closes;
    use crate::trend::TrendLabel;

    fn analyzer() -> Analyzer {
        Analyzer::new(&AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn empty_series_is_data_unavailable() {
        let err = analyzer()
            .analyze(&Ticker::new("META", "Meta"), &[])
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            SeriesError::DataUnavailable { .. }
        ));
    }

    #[test]
    fn short_series_fields_absent_but_record_built() {
        let record = analyzer()
            .analyze(&Ticker::new("UBER", "Uber"), &bars_from_closes(&[100.0; 10]))
            .unwrap();
        assert_eq!(record.trend.total_count, 0);
        assert_eq!(record.trend.label, TrendLabel::StrongBearish);
        assert_eq!(record.change(1), Some(0.0));
        assert_eq!(record.change(30), None);
        // neither 15d nor 30d is available
        assert_eq!(record.momentum_score, 0.0);
        assert_eq!(record.indicators.rsi, None);
    }

    #[test]
    fn rising_year_is_strong_bullish() {
        let closes: Vec<f64> = (100..=351).map(|v| v as f64).collect();
        let bars = bars_from_closes(&closes);
        let record = analyzer().analyze(&Ticker::new("NVDA", "NVIDIA"), &bars).unwrap();

        assert_eq!(record.as_of_date, bars[251].date);
        assert_eq!(record.current.close, 351.0);
        assert_eq!(record.trend.above_count, 5);
        assert_eq!(record.trend.total_count, 5);
        assert_eq!(record.trend.label, TrendLabel::StrongBullish);
        assert_eq!(record.indicators.range.high, Some(351.0));
        assert_eq!(record.indicators.range.low, Some(100.0));
        assert_eq!(record.indicators.rsi, Some(100.0));
        // 30d: 351 vs 321 -> 9.35%; 15d: 351 vs 336 -> 4.46%
        assert_eq!(record.change(30), Some(9.35));
        assert_eq!(record.change(15), Some(4.46));
        assert_eq!(record.momentum_score, 7.39);
    }

    #[test]
    fn failed_outcome_keeps_ticker_and_message() {
        let ticker = Ticker::new("NFLX", "Netflix");
        let outcome = analyzer().outcome(
            &ticker,
            Err(Report::new(SeriesError::DataUnavailable {
                symbol: "NFLX".into(),
            })),
        );
        match outcome {
            TickerOutcome::Failed { ticker: t, error } => {
                assert_eq!(t, ticker);
                assert_eq!(error, "data unavailable for NFLX");
            }
            TickerOutcome::Analyzed(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn batch_keys_by_symbol() {
        let mut batch = AnalysisBatch::new();
        let a = analyzer();
        let bars = bars_from_closes(&[100.0; 20]);
        batch.push(a.outcome(&Ticker::new("MSFT", "Microsoft"), Ok(&bars)));
        batch.push(a.outcome(&Ticker::new("AAPL", "Apple"), Ok(&bars)));
        batch.push(a.outcome(&Ticker::new("META", "Meta"), Ok(&[])));

        assert_eq!(batch.len(), 3);
        let symbols: Vec<&str> = batch.records().iter().map(|r| r.symbol()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(batch.failures().count(), 1);
        assert!(batch.outcomes.get("META").unwrap().record().is_none());
    }

    #[test]
    fn batch_json_round_trip_preserves_nulls_and_bits() {
        let mut batch = AnalysisBatch::new();
        let a = analyzer();
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.37).sin() * 7.3).collect();
        let bars = bars_from_closes(&closes);
        batch.push(a.outcome(&Ticker::new("GOOGL", "Google (Alphabet)"), Ok(&bars)));
        batch.push(a.outcome(&Ticker::new("UBER", "Uber"), Ok(&bars[..3])));
        batch.push(a.outcome(&Ticker::new("META", "Meta"), Ok(&[])));

        let json = serde_json::to_string_pretty(&batch).unwrap();
        assert!(json.contains("\"90d\": null"));
        assert!(json.contains("\"rsi\": null"));

        let parsed: AnalysisBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, batch);

        let original = batch.outcomes.get("GOOGL").unwrap().record().unwrap();
        let restored = parsed.outcomes.get("GOOGL").unwrap().record().unwrap();
        for (a, b) in original.price_changes.iter().zip(restored.price_changes.iter()) {
            assert_eq!(a.1.map(f64::to_bits), b.1.map(f64::to_bits));
        }
        assert_eq!(
            original.indicators.volatility_pct.map(f64::to_bits),
            restored.indicators.volatility_pct.map(f64::to_bits)
        );
    }
}
