pub mod terminal;

use crate::analysis::AnalysisBatch;
use crate::ranking::Summary;

/// Sink for a finished analysis run.
pub trait Reporter: Send + Sync {
    fn report(&self, batch: &AnalysisBatch, summary: &Summary<'_>);
}

/// Human-readable headline sentences for a summary.
pub fn insights(summary: &Summary<'_>) -> Vec<String> {
    let horizon = summary.horizon;
    let mut lines = Vec::new();

    if let Some(best) = &summary.best {
        lines.push(format!(
            "best {horizon}d performer: {} ({:+.2}%)",
            best.symbol, best.value
        ));
    }
    if let Some(worst) = &summary.worst {
        lines.push(format!(
            "worst {horizon}d performer: {} ({:+.2}%)",
            worst.symbol, worst.value
        ));
    }
    if let Some(top) = &summary.highest_momentum {
        lines.push(format!("highest momentum: {} ({:.2})", top.symbol, top.value));
    }
    if !summary.strong_bullish.is_empty() {
        lines.push(format!("strong bullish: {}", summary.strong_bullish.join(", ")));
    }
    if !summary.below_most_mas.is_empty() {
        lines.push(format!(
            "below most moving averages: {}",
            summary.below_most_mas.join(", ")
        ));
    }
    lines.push(format!(
        "{} up, {} flat or down over {horizon}d",
        summary.winners, summary.losers
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::record;
    use crate::ranking::summarize;

    #[test]
    fn insights_name_extremes_and_cohorts() {
        let a = record("NVDA", vec![(30, Some(12.5))], 9.0, 100.0);
        let b = record("UBER", vec![(30, Some(-3.0))], -2.0, 0.0);
        let summary = summarize(&[&a, &b], 30);

        let lines = insights(&summary);
        assert_eq!(
            lines,
            vec![
                "best 30d performer: NVDA (+12.50%)",
                "worst 30d performer: UBER (-3.00%)",
                "highest momentum: NVDA (9.00)",
                "strong bullish: NVDA",
                "below most moving averages: UBER",
                "1 up, 1 flat or down over 30d",
            ]
        );
    }

    #[test]
    fn empty_summary_only_counts() {
        let summary = summarize(&[], 30);
        assert_eq!(insights(&summary), vec!["0 up, 0 flat or down over 30d"]);
    }
}
