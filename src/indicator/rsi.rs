use derive_more::Display;
use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period, close_prices, round2};
use crate::model::OhlcvBar;

/// RSI (Relative Strength Index) from the plain mean of the last `period`
/// gains and losses.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(period, "RSI period")?;
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn required_bars(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, bars: &[OhlcvBar]) -> Option<f64> {
        let prices = close_prices(bars);
        if prices.len() < self.required_bars() {
            return None;
        }

        let window = &prices[prices.len() - self.required_bars()..];
        let deltas: Vec<f64> = window.windows(2).map(|w| w[1] - w[0]).collect();

        let avg_gain = deltas.iter().map(|&d| d.max(0.0)).sum::<f64>() / self.period as f64;
        let avg_loss = deltas.iter().map(|&d| (-d).max(0.0)).sum::<f64>() / self.period as f64;

        Some(rsi_value(avg_gain, avg_loss))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    round2(100.0 - 100.0 / (1.0 + rs))
}

const OVERSOLD_BELOW: f64 = 30.0;
const OVERBOUGHT_ABOVE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl RsiZone {
    pub fn of(rsi: f64) -> Self {
        if rsi < OVERSOLD_BELOW {
            Self::Oversold
        } else if rsi > OVERBOUGHT_ABOVE {
            Self::Overbought
        } else {
            Self::Neutral
        }
    }
}
