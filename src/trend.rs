use std::fmt;

use serde::{Deserialize, Serialize};

use crate::indicator::round2;

/// Qualitative trend, ordered from most bearish to most bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
    #[serde(rename = "Moderately Bearish")]
    ModeratelyBearish,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Moderately Bullish")]
    ModeratelyBullish,
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
}

impl TrendLabel {
    /// Map a strength score onto a label using inclusive lower bounds.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::StrongBullish
        } else if score >= 60.0 {
            Self::ModeratelyBullish
        } else if score >= 40.0 {
            Self::Neutral
        } else if score >= 20.0 {
            Self::ModeratelyBearish
        } else {
            Self::StrongBearish
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBearish => "Strong Bearish",
            Self::ModeratelyBearish => "Moderately Bearish",
            Self::Neutral => "Neutral",
            Self::ModeratelyBullish => "Moderately Bullish",
            Self::StrongBullish => "Strong Bullish",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAssessment {
    pub label: TrendLabel,
    pub strength_score: f64,
    pub above_count: usize,
    pub total_count: usize,
}

/// Classify `price` against the moving averages that have a value.
///
/// A price equal to an average does not count as above it. With no averages
/// at all the score is 0, which lands in "Strong Bearish".
pub fn classify(price: f64, moving_averages: impl IntoIterator<Item = f64>) -> TrendAssessment {
    let (above_count, total_count) = moving_averages
        .into_iter()
        .fold((0usize, 0usize), |(above, total), ma| {
            (above + usize::from(price > ma), total + 1)
        });

    let score = if total_count == 0 {
        0.0
    } else {
        100.0 * above_count as f64 / total_count as f64
    };

    TrendAssessment {
        label: TrendLabel::from_score(score),
        strength_score: round2(score),
        above_count,
        total_count,
    }
}
