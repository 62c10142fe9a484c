use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period, close_prices, round2};
use crate::model::OhlcvBar;

/// Sample standard deviation of daily percentage returns over the trailing
/// `window` returns, in percent.
///
/// A shorter series uses whatever returns it has; at least two are needed.
pub struct Volatility {
    window: usize,
}

impl Volatility {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(window, "volatility window")?;
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Indicator for Volatility {
    fn required_bars(&self) -> usize {
        self.window + 1
    }

    fn calculate(&self, bars: &[OhlcvBar]) -> Option<f64> {
        let prices = close_prices(bars);
        let tail = &prices[prices.len().saturating_sub(self.required_bars())..];

        // a zero close has no defined return to the next day
        let returns: Vec<f64> = tail
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| w[1] / w[0] - 1.0)
            .collect();

        if returns.len() < 2 {
            return None;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(round2(variance.sqrt() * 100.0))
    }
}
