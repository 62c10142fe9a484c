//! Cross-sectional views over one run's records. Nothing here mutates a record.

use std::cmp::Ordering;

use crate::analysis::AnalysisRecord;

/// Strength score at or above which a ticker counts as strongly bullish.
pub const STRONG_BULLISH_SCORE: f64 = 80.0;
/// Strength score below which a ticker sits under most of its moving averages.
pub const WEAK_SCORE: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<'a> {
    pub symbol: &'a str,
    pub name: &'a str,
    pub value: f64,
}

/// Descending by value, then by symbol ascending.
fn by_value_desc(a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
    b.value.total_cmp(&a.value).then_with(|| a.symbol.cmp(b.symbol))
}

fn ranked<'a>(
    records: &[&'a AnalysisRecord],
    value: impl Fn(&AnalysisRecord) -> Option<f64>,
) -> Vec<Ranked<'a>> {
    let mut ranked: Vec<Ranked<'a>> = records
        .iter()
        .copied()
        .filter_map(|r| {
            value(r).map(|value| Ranked {
                symbol: &r.ticker.symbol,
                name: &r.ticker.name,
                value,
            })
        })
        .collect();
    ranked.sort_by(by_value_desc);
    ranked
}

/// Records ranked by their `horizon`-day change. Records without that change
/// are left out rather than placed anywhere.
pub fn best_performers<'a>(records: &[&'a AnalysisRecord], horizon: usize) -> Vec<Ranked<'a>> {
    ranked(records, |r| r.change(horizon))
}

pub fn momentum_ranking<'a>(records: &[&'a AnalysisRecord]) -> Vec<Ranked<'a>> {
    ranked(records, |r| Some(r.momentum_score))
}

pub fn strong_bullish<'a>(records: &[&'a AnalysisRecord]) -> Vec<&'a AnalysisRecord> {
    records
        .iter()
        .copied()
        .filter(|r| r.trend.strength_score >= STRONG_BULLISH_SCORE)
        .collect()
}

pub fn weak<'a>(records: &[&'a AnalysisRecord]) -> Vec<&'a AnalysisRecord> {
    records
        .iter()
        .copied()
        .filter(|r| r.trend.strength_score < WEAK_SCORE)
        .collect()
}

/// Headline facts for one run on one ranking horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<'a> {
    pub horizon: usize,
    pub best: Option<Ranked<'a>>,
    pub worst: Option<Ranked<'a>>,
    pub highest_momentum: Option<Ranked<'a>>,
    pub strong_bullish: Vec<&'a str>,
    pub below_most_mas: Vec<&'a str>,
    /// Tickers with a positive change on the horizon.
    pub winners: usize,
    /// Tickers with a zero or negative change on the horizon.
    pub losers: usize,
}

pub fn summarize<'a>(records: &[&'a AnalysisRecord], horizon: usize) -> Summary<'a> {
    let performers = best_performers(records, horizon);
    let winners = performers.iter().filter(|p| p.value > 0.0).count();

    Summary {
        horizon,
        best: performers.first().cloned(),
        worst: performers.last().cloned(),
        highest_momentum: momentum_ranking(records).into_iter().next(),
        strong_bullish: strong_bullish(records)
            .into_iter()
            .map(AnalysisRecord::symbol)
            .collect(),
        below_most_mas: weak(records).into_iter().map(AnalysisRecord::symbol).collect(),
        winners,
        losers: performers.len() - winners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::record;

    fn symbols(ranked: &[Ranked<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.symbol.to_string()).collect()
    }

    #[test]
    fn absent_horizon_excluded_not_misplaced() {
        let a = record("A", vec![(30, Some(10.0))], 0.0, 50.0);
        let b = record("B", vec![(30, Some(-5.0))], 0.0, 50.0);
        let c = record("C", vec![(30, None)], 0.0, 50.0);
        let records = vec![&c, &b, &a];

        let best = best_performers(&records, 30);
        assert_eq!(symbols(&best), vec!["A", "B"]);

        let summary = summarize(&records, 30);
        assert_eq!(summary.best.unwrap().symbol, "A");
        assert_eq!(summary.worst.unwrap().symbol, "B");
        assert_eq!(summary.winners, 1);
        assert_eq!(summary.losers, 1);
    }

    #[test]
    fn ties_broken_by_symbol() {
        let z = record("ZZ", vec![(30, Some(3.0))], 1.0, 50.0);
        let a = record("AA", vec![(30, Some(3.0))], 1.0, 50.0);
        let m = record("MM", vec![(30, Some(-1.0))], 1.0, 50.0);
        let records = vec![&z, &m, &a];

        assert_eq!(symbols(&best_performers(&records, 30)), vec!["AA", "ZZ", "MM"]);
        assert_eq!(symbols(&momentum_ranking(&records)), vec!["AA", "MM", "ZZ"]);
    }

    #[test]
    fn ranking_is_order_independent() {
        let r1 = record("NVDA", vec![(30, Some(12.0))], 8.0, 100.0);
        let r2 = record("AAPL", vec![(30, Some(12.0))], 8.0, 60.0);
        let r3 = record("UBER", vec![(30, Some(-2.0))], -4.0, 0.0);

        let forward = momentum_ranking(&[&r1, &r2, &r3]);
        let backward = momentum_ranking(&[&r3, &r2, &r1]);
        assert_eq!(forward, backward);
        assert_eq!(symbols(&forward), vec!["AAPL", "NVDA", "UBER"]);
    }

    #[test]
    fn momentum_zero_still_ranked() {
        let a = record("A", vec![], 0.0, 50.0);
        let b = record("B", vec![], -1.5, 50.0);
        let ranked = momentum_ranking(&[&b, &a]);
        assert_eq!(symbols(&ranked), vec!["A", "B"]);
        assert_eq!(ranked[0].value, 0.0);
    }

    #[test]
    fn cohorts_read_strength_score() {
        let strong = record("S", vec![], 0.0, 80.0);
        let middle = record("M", vec![], 0.0, 40.0);
        let weak_one = record("W", vec![], 0.0, 20.0);
        let records = vec![&strong, &middle, &weak_one];

        let bullish: Vec<&str> = strong_bullish(&records).iter().map(|r| r.symbol()).collect();
        assert_eq!(bullish, vec!["S"]);
        let below: Vec<&str> = weak(&records).iter().map(|r| r.symbol()).collect();
        assert_eq!(below, vec!["W"]);

        let summary = summarize(&records, 30);
        assert_eq!(summary.strong_bullish, vec!["S"]);
        assert_eq!(summary.below_most_mas, vec!["W"]);
    }

    #[test]
    fn worst_tie_uses_same_tie_break() {
        let a = record("A", vec![(30, Some(4.0))], 0.0, 50.0);
        let b = record("B", vec![(30, Some(-5.0))], 0.0, 50.0);
        let c = record("C", vec![(30, Some(-5.0))], 0.0, 50.0);
        let summary = summarize(&[&c, &a, &b], 30);
        assert_eq!(summary.best.unwrap().symbol, "A");
        assert_eq!(summary.worst.unwrap().symbol, "C");
    }

    #[test]
    fn empty_run_has_no_extremes() {
        let summary = summarize(&[], 30);
        assert!(summary.best.is_none());
        assert!(summary.worst.is_none());
        assert!(summary.highest_momentum.is_none());
        assert_eq!(summary.winners + summary.losers, 0);
    }

    #[test]
    fn inputs_untouched() {
        let a = record("A", vec![(30, Some(1.0))], 2.0, 90.0);
        let before = a.clone();
        let _ = summarize(&[&a], 30);
        assert_eq!(a, before);
    }
}
