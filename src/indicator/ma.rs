use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period, close_prices, round2};
use crate::model::OhlcvBar;

/// Simple Moving Average of closes over a trailing window.
pub struct Sma {
    period: usize,
}

/// One moving average at the latest bar, plus how far the close sits from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub period: usize,
    pub value: Option<f64>,
    pub deviation_pct: Option<f64>,
}

impl MovingAverage {
    pub fn name(&self) -> String {
        format!("{}d_MA", self.period)
    }

    pub fn deviation_name(&self) -> String {
        format!("{}d_MA_diff_%", self.period)
    }
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(period, "moving average period")?;
        Ok(Self { period })
    }

    /// Unrounded mean of the last `period` prices.
    pub fn mean(&self, prices: &[f64]) -> Option<f64> {
        if prices.len() < self.period {
            return None;
        }
        let window = &prices[prices.len() - self.period..];
        Some(window.iter().sum::<f64>() / self.period as f64)
    }

    pub fn evaluate(&self, bars: &[OhlcvBar]) -> MovingAverage {
        let prices = close_prices(bars);
        let mean = self.mean(&prices);
        let deviation_pct = match (mean, prices.last()) {
            (Some(ma), Some(&close)) if ma != 0.0 => Some(round2((close - ma) / ma * 100.0)),
            _ => None,
        };

        MovingAverage {
            period: self.period,
            value: mean.map(round2),
            deviation_pct,
        }
    }
}

impl Indicator for Sma {
    fn required_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[OhlcvBar]) -> Option<f64> {
        self.mean(&close_prices(bars)).map(round2)
    }
}
