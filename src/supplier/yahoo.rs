use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::SupplierError;
use crate::model::RawBar;
use crate::supplier::BarSupplier;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUPPLIER_NAME: &str = "yahoo";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stock-ranker";
const MAX_BACKOFF_SECS: u64 = 30;
const TRADING_DAYS_PER_WEEK: u64 = 5;
/// Extra calendar days to absorb market holidays.
const CALENDAR_SLACK_DAYS: u64 = 14;

pub struct YahooSupplier {
    client: reqwest::Client,
    rate_limiter: DefaultDirectRateLimiter,
    max_retries: u32,
}

impl YahooSupplier {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, Report<SupplierError>> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .change_context(SupplierError::Client {
                supplier: SUPPLIER_NAME.into(),
            })?;
        // Yahoo throttles bursts aggressively; stay well under it
        let quota = Quota::per_second(nonzero!(2u32));
        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            max_retries,
        })
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        period1: i64,
        period2: i64,
    ) -> Result<ChartResponse, Report<SupplierError>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{YAHOO_CHART_URL}/{symbol}");
        let params = [
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_owned()),
            ("events", "history".to_owned()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .change_context(SupplierError::Request {
                supplier: SUPPLIER_NAME.into(),
            })?;

        if !response.status().is_success() {
            return Err(Report::new(SupplierError::Request {
                supplier: SUPPLIER_NAME.into(),
            })
            .attach(format!("HTTP status: {}", response.status())));
        }

        response
            .json()
            .await
            .change_context(SupplierError::ResponseParse {
                supplier: SUPPLIER_NAME.into(),
            })
    }
}

impl BarSupplier for YahooSupplier {
    fn name(&self) -> &str {
        SUPPLIER_NAME
    }

    fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> BoxFuture<'_, Result<Vec<RawBar>, Report<SupplierError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            let now = Utc::now();
            let period2 = now.timestamp();
            let period1 = now
                .checked_sub_days(Days::new(calendar_span(lookback)))
                .unwrap_or(DateTime::UNIX_EPOCH)
                .timestamp();

            let mut backoff = Duration::from_secs(1);
            let mut attempt = 0;
            let chart = loop {
                match self.fetch_chart(&symbol, period1, period2).await {
                    Ok(chart) => break chart,
                    Err(e)
                        if attempt < self.max_retries
                            && matches!(e.current_context(), SupplierError::Request { .. }) =>
                    {
                        attempt += 1;
                        warn!(symbol = %symbol, attempt, error = ?e, "yahoo request failed, retrying...");
                        sleep(backoff).await;
                        backoff = (backoff * 2).min(Duration::from_secs(MAX_BACKOFF_SECS));
                    }
                    Err(e) => return Err(e.attach(format!("symbol: {symbol}"))),
                }
            };

            let bars = chart.into_raw_bars(&symbol)?;
            info!(symbol = %symbol, bars = bars.len(), "yahoo daily bars fetched");
            Ok(bars)
        })
    }
}

/// Calendar days to request so that `lookback` trading days fit.
fn calendar_span(lookback: usize) -> u64 {
    (lookback as u64).div_ceil(TRADING_DAYS_PER_WEEK) * 7
        + CALENDAR_SLACK_DAYS
}

// ---------------------------------------------------------------------------
// Yahoo chart API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResponse {
    fn into_raw_bars(self, symbol: &str) -> Result<Vec<RawBar>, Report<SupplierError>> {
        if let Some(err) = self.chart.error {
            return Err(Report::new(SupplierError::ResponseParse {
                supplier: SUPPLIER_NAME.into(),
            })
            .attach(format!("{}: {}", err.code, err.description)));
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Err(Report::new(SupplierError::Empty {
                supplier: SUPPLIER_NAME.into(),
                symbol: symbol.to_owned(),
            }));
        };

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let offset = result.meta.gmtoffset;
        let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let row = (
                field(&quote.open, i),
                field(&quote.high, i),
                field(&quote.low, i),
                field(&quote.close, i),
                field(&quote.volume, i),
            );
            // Yahoo pads halted sessions with nulls
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
                debug!(symbol, timestamp = ts, "skipping incomplete yahoo row");
                continue;
            };
            let Some(moment) = DateTime::from_timestamp(ts + offset, 0) else {
                debug!(symbol, timestamp = ts, "skipping out-of-range yahoo timestamp");
                continue;
            };
            bars.push(RawBar {
                date: moment.date_naive(),
                open,
                high,
                low,
                close,
                volume,
            });
        }
        Ok(bars)
    }
}
