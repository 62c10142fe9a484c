use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum SupplierError {
    #[display("failed to build client for {supplier}")]
    Client { supplier: String },
    #[display("request to {supplier} failed")]
    Request { supplier: String },
    #[display("failed to parse response from {supplier}")]
    ResponseParse { supplier: String },
    #[display("{supplier} returned no bars for {symbol}")]
    Empty { supplier: String, symbol: String },
}

#[derive(Debug, Display, Error)]
pub enum SeriesError {
    #[display("data unavailable for {symbol}")]
    DataUnavailable { symbol: String },
}

/// Why a raw bar was refused entry into a series.
#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum BarRejection {
    #[display("non-finite field")]
    NonFinite,
    #[display("negative price")]
    NegativePrice,
    #[display("negative volume {volume}")]
    NegativeVolume { volume: f64 },
    #[display("fractional volume {volume}")]
    FractionalVolume { volume: f64 },
    #[display("volume {volume} out of range")]
    VolumeOutOfRange { volume: f64 },
    #[display("high {high} below low {low}")]
    HighBelowLow { high: f64, low: f64 },
    #[display("date {date} does not follow {previous}")]
    NonMonotonicDate {
        date: chrono::NaiveDate,
        previous: chrono::NaiveDate,
    },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ExportError {
    #[display("failed to serialize analysis batch")]
    Serialize,
    #[display("failed to write analysis batch")]
    Write,
    #[display("failed to read analysis batch")]
    Read,
    #[display("failed to parse analysis batch")]
    Parse,
}
