use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BarRejection;

/// A tracked equity: the symbol is the key used everywhere, the name is for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub name: String,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.name)
    }
}

/// A daily row exactly as a supplier handed it over, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A validated daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl TryFrom<&RawBar> for OhlcvBar {
    type Error = BarRejection;

    /// Checks the per-bar invariants. Date ordering is checked by the series.
    fn try_from(raw: &RawBar) -> Result<Self, Self::Error> {
        let prices = [raw.open, raw.high, raw.low, raw.close];
        if prices.iter().chain([&raw.volume]).any(|v| !v.is_finite()) {
            return Err(BarRejection::NonFinite);
        }
        if prices.iter().any(|&p| p < 0.0) {
            return Err(BarRejection::NegativePrice);
        }
        if raw.volume < 0.0 {
            return Err(BarRejection::NegativeVolume { volume: raw.volume });
        }
        if raw.volume.fract() != 0.0 {
            return Err(BarRejection::FractionalVolume { volume: raw.volume });
        }
        // u64::MAX rounds up to 2^64 as f64, so this rejects everything that would saturate
        if raw.volume >= u64::MAX as f64 {
            return Err(BarRejection::VolumeOutOfRange { volume: raw.volume });
        }
        if raw.high < raw.low {
            return Err(BarRejection::HighBelowLow {
                high: raw.high,
                low: raw.low,
            });
        }

        Ok(Self {
            date: raw.date,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(high: f64, low: f64, volume: f64) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: 10.0,
            high,
            low,
            close: 10.0,
            volume,
        }
    }

    #[test]
    fn valid_bar_converts() {
        let bar = OhlcvBar::try_from(&raw(11.0, 9.0, 1_000.0)).unwrap();
        assert_eq!(bar.volume, 1_000);
        assert_eq!(bar.high, 11.0);
    }

    #[test]
    fn negative_volume_rejected() {
        let err = OhlcvBar::try_from(&raw(11.0, 9.0, -5.0)).unwrap_err();
        assert_eq!(err, BarRejection::NegativeVolume { volume: -5.0 });
    }

    #[test]
    fn high_below_low_rejected() {
        let err = OhlcvBar::try_from(&raw(8.0, 9.0, 5.0)).unwrap_err();
        assert_eq!(err, BarRejection::HighBelowLow { high: 8.0, low: 9.0 });
    }

    #[test]
    fn fractional_volume_rejected_not_truncated() {
        assert!(matches!(
            OhlcvBar::try_from(&raw(11.0, 9.0, 10.5)),
            Err(BarRejection::FractionalVolume { .. })
        ));
    }

    #[test]
    fn volume_beyond_u64_rejected_not_clamped() {
        assert_eq!(
            OhlcvBar::try_from(&raw(11.0, 9.0, 1e20)),
            Err(BarRejection::VolumeOutOfRange { volume: 1e20 })
        );
        // largest f64 below 2^64 still fits
        let bar = OhlcvBar::try_from(&raw(11.0, 9.0, 18_446_744_073_709_549_568.0)).unwrap();
        assert_eq!(bar.volume, 18_446_744_073_709_549_568);
    }

    #[test]
    fn nan_price_rejected() {
        let mut bar = raw(11.0, 9.0, 5.0);
        bar.close = f64::NAN;
        assert_eq!(OhlcvBar::try_from(&bar), Err(BarRejection::NonFinite));
    }

    #[test]
    fn ticker_display() {
        assert_eq!(Ticker::new("AAPL", "Apple").to_string(), "AAPL (Apple)");
    }
}
