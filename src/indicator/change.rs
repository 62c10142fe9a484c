use std::fmt;

use error_stack::Report;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period, pct_change, round2};
use crate::model::OhlcvBar;

/// Percentage change of the close versus `horizon` bars ago.
pub struct PriceChange {
    horizon: usize,
}

impl PriceChange {
    pub fn new(horizon: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(horizon, "price change horizon")?;
        Ok(Self { horizon })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }
}

impl Indicator for PriceChange {
    fn required_bars(&self) -> usize {
        self.horizon + 1
    }

    fn calculate(&self, bars: &[OhlcvBar]) -> Option<f64> {
        if bars.len() < self.required_bars() {
            return None;
        }
        let current = bars[bars.len() - 1].close;
        let base = bars[bars.len() - 1 - self.horizon].close;
        pct_change(base, current).map(round2)
    }
}

pub fn horizon_label(horizon: usize) -> String {
    format!("{horizon}d")
}

fn parse_label(label: &str) -> Option<usize> {
    label.strip_suffix('d')?.parse().ok()
}

/// Price change per horizon, in configured order.
///
/// Serialized as a map keyed by label (`{"1d": 0.5, "90d": null}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceChangeSet {
    entries: Vec<(usize, Option<f64>)>,
}

impl PriceChangeSet {
    pub fn new(entries: Vec<(usize, Option<f64>)>) -> Self {
        Self { entries }
    }

    /// The change for `horizon`; `None` when absent or not configured.
    pub fn get(&self, horizon: usize) -> Option<f64> {
        self.entries
            .iter()
            .find(|(h, _)| *h == horizon)
            .and_then(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<f64>)> + '_ {
        self.entries.iter().copied()
    }
}

impl Serialize for PriceChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (horizon, change) in &self.entries {
            map.serialize_entry(&horizon_label(*horizon), change)?;
        }
        map.end()
    }
}

struct PriceChangeSetVisitor;

impl<'de> Visitor<'de> for PriceChangeSetVisitor {
    type Value = PriceChangeSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of horizon labels like \"15d\" to a number or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((label, change)) = access.next_entry::<String, Option<f64>>()? {
            let horizon = parse_label(&label)
                .ok_or_else(|| de::Error::custom(format!("invalid horizon label: {label}")))?;
            entries.push((horizon, change));
        }
        Ok(PriceChangeSet { entries })
    }
}

impl<'de> Deserialize<'de> for PriceChangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PriceChangeSetVisitor)
    }
}
