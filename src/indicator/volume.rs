use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period};
use crate::model::OhlcvBar;

/// Average traded volume over a trailing window, truncated to whole shares.
pub struct VolumeAverage {
    window: usize,
}

impl VolumeAverage {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(window, "volume window")?;
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn average(&self, bars: &[OhlcvBar]) -> Option<u64> {
        if bars.len() < self.window {
            return None;
        }
        let total: u128 = bars[bars.len() - self.window..]
            .iter()
            .map(|b| u128::from(b.volume))
            .sum();
        u64::try_from(total / self.window as u128).ok()
    }
}

impl Indicator for VolumeAverage {
    fn required_bars(&self) -> usize {
        self.window
    }

    fn calculate(&self, bars: &[OhlcvBar]) -> Option<f64> {
        self.average(bars).map(|v| v as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::bars_from_closes;

    fn bars_with_volumes(vols: &[u64]) -> Vec<OhlcvBar> {
        let mut bars = bars_from_closes(&vec![100.0; vols.len()]);
        for (bar, &v) in bars.iter_mut().zip(vols) {
            bar.volume = v;
        }
        bars
    }

    #[test]
    fn volume_window_zero_invalid() {
        assert!(VolumeAverage::new(0).is_err());
    }

    #[test]
    fn volume_insufficient_data() {
        let avg = VolumeAverage::new(5).unwrap();
        assert_eq!(avg.average(&bars_with_volumes(&[1; 4])), None);
    }

    #[test]
    fn volume_truncates() {
        let avg = VolumeAverage::new(3).unwrap();
        // (1 + 2 + 2) / 3 = 1.67 -> 1
        assert_eq!(avg.average(&bars_with_volumes(&[1, 2, 2])), Some(1));
    }

    #[test]
    fn volume_uses_trailing_window() {
        let avg = VolumeAverage::new(2).unwrap();
        assert_eq!(avg.average(&bars_with_volumes(&[1_000, 10, 20])), Some(15));
        assert_eq!(avg.calculate(&bars_with_volumes(&[1_000, 10, 20])), Some(15.0));
    }
}
