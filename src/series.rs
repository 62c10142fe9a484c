use std::collections::HashMap;

use error_stack::{Report, bail};

use crate::error::{BarRejection, SeriesError};
use crate::model::{OhlcvBar, RawBar};

/// A raw row that was refused, with its position in the supplier's output.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBar {
    pub index: usize,
    pub raw: RawBar,
    pub reason: BarRejection,
}

/// Ascending, strictly date-increasing bars for one ticker.
///
/// Gaps are allowed; indicators index by position, never by calendar arithmetic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    bars: Vec<OhlcvBar>,
}

impl Series {
    /// Validate raw rows one by one. A malformed row is dropped on its own; the
    /// rest of the series is kept.
    pub fn from_raw(rows: &[RawBar]) -> (Self, Vec<RejectedBar>) {
        let mut bars: Vec<OhlcvBar> = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();

        for (index, raw) in rows.iter().enumerate() {
            let checked = OhlcvBar::try_from(raw).and_then(|bar| match bars.last() {
                Some(prev) if bar.date <= prev.date => Err(BarRejection::NonMonotonicDate {
                    date: bar.date,
                    previous: prev.date,
                }),
                _ => Ok(bar),
            });

            match checked {
                Ok(bar) => bars.push(bar),
                Err(reason) => rejected.push(RejectedBar {
                    index,
                    raw: raw.clone(),
                    reason,
                }),
            }
        }

        (Self { bars }, rejected)
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent `n` bars, or all of them when fewer exist.
    pub fn tail(&self, n: usize) -> &[OhlcvBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }
}

/// One series per ticker symbol.
#[derive(Debug, Default)]
pub struct SeriesStore {
    series: HashMap<String, Series>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and record the supplier's rows for `symbol`, replacing any
    /// earlier series. Returns the rows that were rejected.
    pub fn insert(&mut self, symbol: &str, rows: &[RawBar]) -> Vec<RejectedBar> {
        let (series, rejected) = Series::from_raw(rows);
        for r in &rejected {
            tracing::warn!(symbol, index = r.index, date = %r.raw.date, reason = %r.reason, "rejected malformed bar");
        }
        self.series.insert(symbol.to_owned(), series);
        rejected
    }

    /// The most recent `lookback` bars for `symbol` in ascending date order.
    pub fn recent(&self, symbol: &str, lookback: usize) -> Result<&[OhlcvBar], Report<SeriesError>> {
        match self.series.get(symbol) {
            Some(series) if !series.is_empty() => Ok(series.tail(lookback)),
            _ => bail!(SeriesError::DataUnavailable {
                symbol: symbol.to_owned(),
            }),
        }
    }
}
