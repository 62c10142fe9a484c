use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::indicator::{check_period, round2};
use crate::model::OhlcvBar;

/// Highest and lowest close over the trailing window (52 weeks by default).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub high: Option<f64>,
    pub low: Option<f64>,
}

pub struct RangeWindow {
    window: usize,
}

impl RangeWindow {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(window, "range window")?;
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Both bounds stay absent unless the full window is available.
    pub fn evaluate(&self, bars: &[OhlcvBar]) -> PriceRange {
        if bars.len() < self.window {
            return PriceRange::default();
        }
        let closes = bars[bars.len() - self.window..].iter().map(|b| b.close);
        let (high, low) = closes.fold((f64::MIN, f64::MAX), |(hi, lo), c| (hi.max(c), lo.min(c)));

        PriceRange {
            high: Some(round2(high)),
            low: Some(round2(low)),
        }
    }
}
