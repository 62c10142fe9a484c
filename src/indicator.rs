pub mod change;
pub mod ma;
pub mod range;
pub mod rsi;
pub mod volatility;
pub mod volume;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::IndicatorError;
use crate::model::OhlcvBar;

use change::{PriceChange, PriceChangeSet};
use ma::{MovingAverage, Sma};
use range::{PriceRange, RangeWindow};
use rsi::Rsi;
use volatility::Volatility;
use volume::VolumeAverage;

/// A technical indicator evaluated at the latest bar of a series.
///
/// Bars must be in ascending chronological order (oldest first). `None` means
/// the series is too short for the indicator's window.
pub trait Indicator {
    /// Minimum number of bars required to produce a value.
    fn required_bars(&self) -> usize;

    fn calculate(&self, bars: &[OhlcvBar]) -> Option<f64>;
}

/// Extract close prices from a slice of bars.
pub fn close_prices(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Round to two decimal places from the exact binary value, so `0.015`
/// (stored just below the midpoint) rounds down. Exact ties go to even.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Unrounded percentage change from `base` to `value`; `None` when `base` is zero.
pub fn pct_change(base: f64, value: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    Some((value - base) / base * 100.0)
}

pub(crate) fn check_period(period: usize, what: &str) -> Result<(), Report<IndicatorError>> {
    if period == 0 {
        error_stack::bail!(IndicatorError::InvalidParameter {
            name: format!("{what} must be > 0"),
        });
    }
    Ok(())
}

/// Every per-ticker indicator value. Absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub moving_averages: Vec<MovingAverage>,
    pub rsi_window: usize,
    pub rsi: Option<f64>,
    pub volatility_window: usize,
    pub volatility_pct: Option<f64>,
    pub volume_window: usize,
    pub avg_volume: Option<u64>,
    pub range: PriceRange,
}

impl IndicatorSet {
    /// Every value under its reported name (`"15d_MA"`, `"15d_MA_diff_%"`,
    /// `"RSI_14"`, `"volatility_30d"`, `"avg_volume_30d"`, `"52w_high"`,
    /// `"52w_low"`), moving averages first. `None` means insufficient history.
    pub fn entries(&self) -> Vec<(String, Option<f64>)> {
        let mut entries = Vec::with_capacity(self.moving_averages.len() * 2 + 5);
        for ma in &self.moving_averages {
            entries.push((ma.name(), ma.value));
            entries.push((ma.deviation_name(), ma.deviation_pct));
        }
        entries.push((format!("RSI_{}", self.rsi_window), self.rsi));
        entries.push((
            format!("volatility_{}d", self.volatility_window),
            self.volatility_pct,
        ));
        entries.push((
            format!("avg_volume_{}d", self.volume_window),
            self.avg_volume.map(|v| v as f64),
        ));
        entries.push(("52w_high".to_owned(), self.range.high));
        entries.push(("52w_low".to_owned(), self.range.low));
        entries
    }

    /// Moving-average values that were actually computed.
    pub fn defined_moving_averages(&self) -> impl Iterator<Item = f64> + '_ {
        self.moving_averages.iter().filter_map(|ma| ma.value)
    }
}

/// Builds the configured indicators once and evaluates them per series.
pub struct IndicatorEngine {
    moving_averages: Vec<Sma>,
    rsi: Rsi,
    volatility: Volatility,
    volume: VolumeAverage,
    range: RangeWindow,
    changes: Vec<PriceChange>,
}

impl IndicatorEngine {
    pub fn new(config: &AnalysisConfig) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            moving_averages: config
                .ma_windows
                .iter()
                .map(|&p| Sma::new(p))
                .collect::<Result<_, _>>()?,
            rsi: Rsi::new(config.rsi_window)?,
            volatility: Volatility::new(config.volatility_window)?,
            volume: VolumeAverage::new(config.volume_window)?,
            range: RangeWindow::new(config.range_window)?,
            changes: config
                .change_horizons
                .iter()
                .map(|&h| PriceChange::new(h))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Bars needed for every configured indicator to be defined.
    pub fn required_bars(&self) -> usize {
        let scalars: [&dyn Indicator; 3] = [&self.rsi, &self.volatility, &self.volume];
        self.moving_averages
            .iter()
            .map(|ma| ma.required_bars())
            .chain(self.changes.iter().map(|c| c.required_bars()))
            .chain(scalars.iter().map(|i| i.required_bars()))
            .chain(std::iter::once(self.range.window()))
            .max()
            .unwrap_or(1)
    }

    pub fn indicators(&self, bars: &[OhlcvBar]) -> IndicatorSet {
        IndicatorSet {
            moving_averages: self.moving_averages.iter().map(|ma| ma.evaluate(bars)).collect(),
            rsi_window: self.rsi.period(),
            rsi: self.rsi.calculate(bars),
            volatility_window: self.volatility.window(),
            volatility_pct: self.volatility.calculate(bars),
            volume_window: self.volume.window(),
            avg_volume: self.volume.average(bars),
            range: self.range.evaluate(bars),
        }
    }

    pub fn price_changes(&self, bars: &[OhlcvBar]) -> PriceChangeSet {
        PriceChangeSet::new(
            self.changes
                .iter()
                .map(|c| (c.horizon(), c.calculate(bars)))
                .collect(),
        )
    }
}
