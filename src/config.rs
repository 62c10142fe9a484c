use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::Ticker;
use crate::momentum::MomentumWeight;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_output_path() -> String {
    "./stock_analysis.json".into()
}

fn default_supplier_kind() -> String {
    "yahoo".into()
}

fn default_data_dir() -> String {
    "./data".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_ma_windows() -> Vec<usize> {
    vec![15, 30, 50, 100, 200]
}

fn default_change_horizons() -> Vec<usize> {
    vec![1, 5, 15, 30, 90]
}

fn default_rsi_window() -> usize {
    14
}

fn default_thirty() -> usize {
    30
}

fn default_range_window() -> usize {
    252
}

fn default_momentum_weights() -> Vec<MomentumWeight> {
    vec![
        MomentumWeight {
            horizon: 15,
            weight: 0.4,
        },
        MomentumWeight {
            horizon: 30,
            weight: 0.6,
        },
    ]
}

fn default_tickers() -> Vec<Ticker> {
    [
        ("META", "Meta (Facebook)"),
        ("AAPL", "Apple"),
        ("AMZN", "Amazon"),
        ("NFLX", "Netflix"),
        ("GOOGL", "Google (Alphabet)"),
        ("MSFT", "Microsoft"),
        ("NVDA", "NVIDIA"),
        ("UBER", "Uber"),
    ]
    .into_iter()
    .map(|(symbol, name)| Ticker::new(symbol, name))
    .collect()
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub supplier: SupplierConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default = "default_tickers")]
    pub tickers: Vec<Ticker>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            supplier: SupplierConfig::default(),
            analysis: AnalysisConfig::default(),
            tickers: default_tickers(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            output_path: default_output_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SupplierConfig {
    /// Accepted values: `"yahoo"` | `"file"`
    #[serde(default = "default_supplier_kind")]
    pub kind: String,
    /// Directory of `<SYMBOL>.json` files for the `file` supplier.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Minimum spacing between two remote requests.
    #[serde(default)]
    pub request_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl SupplierConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            kind: default_supplier_kind(),
            data_dir: default_data_dir(),
            request_delay_ms: 0,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Windows and weights used by the indicator, trend and momentum stages.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_ma_windows")]
    pub ma_windows: Vec<usize>,
    #[serde(default = "default_change_horizons")]
    pub change_horizons: Vec<usize>,
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,
    #[serde(default = "default_thirty")]
    pub volatility_window: usize,
    #[serde(default = "default_thirty")]
    pub volume_window: usize,
    #[serde(default = "default_range_window")]
    pub range_window: usize,
    #[serde(default = "default_momentum_weights")]
    pub momentum_weights: Vec<MomentumWeight>,
    /// Horizon used for best/worst performer ranking.
    #[serde(default = "default_thirty")]
    pub ranking_horizon: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ma_windows: default_ma_windows(),
            change_horizons: default_change_horizons(),
            rsi_window: default_rsi_window(),
            volatility_window: default_thirty(),
            volume_window: default_thirty(),
            range_window: default_range_window(),
            momentum_weights: default_momentum_weights(),
            ranking_horizon: default_thirty(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];
const VALID_SUPPLIERS: &[&str] = &["yahoo", "file"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_tickers(config)?;
    validate_windows(&config.analysis)?;
    validate_horizon_references(&config.analysis)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_LOG_FORMATS.contains(&config.general.log_format.as_str()) {
        return Err(invalid(format!(
            "general.log_format \"{}\" is not one of {VALID_LOG_FORMATS:?}",
            config.general.log_format
        )));
    }
    if !VALID_SUPPLIERS.contains(&config.supplier.kind.as_str()) {
        return Err(invalid(format!(
            "supplier.kind \"{}\" is not one of {VALID_SUPPLIERS:?}",
            config.supplier.kind
        )));
    }
    Ok(())
}

fn validate_tickers(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.tickers.is_empty() {
        return Err(invalid("tickers: at least one ticker is required".into()));
    }
    let mut seen = HashSet::new();
    for ticker in &config.tickers {
        if ticker.symbol.trim().is_empty() {
            return Err(invalid(format!(
                "tickers[name={}].symbol is empty",
                ticker.name
            )));
        }
        if !seen.insert(ticker.symbol.as_str()) {
            return Err(invalid(format!(
                "tickers: duplicate symbol \"{}\"",
                ticker.symbol
            )));
        }
    }
    Ok(())
}

fn validate_windows(analysis: &AnalysisConfig) -> Result<(), Report<ConfigError>> {
    let scalars = [
        ("rsi_window", analysis.rsi_window),
        ("volatility_window", analysis.volatility_window),
        ("volume_window", analysis.volume_window),
        ("range_window", analysis.range_window),
    ];
    for (name, value) in scalars {
        if value == 0 {
            return Err(invalid(format!("analysis.{name} must be > 0")));
        }
    }
    let lists = [
        ("ma_windows", &analysis.ma_windows),
        ("change_horizons", &analysis.change_horizons),
    ];
    for (name, values) in lists {
        if values.contains(&0) {
            return Err(invalid(format!("analysis.{name}: values must be > 0")));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = values.iter().find(|v| !seen.insert(**v)) {
            return Err(invalid(format!("analysis.{name}: duplicate value {dup}")));
        }
    }
    Ok(())
}

fn validate_horizon_references(analysis: &AnalysisConfig) -> Result<(), Report<ConfigError>> {
    for w in &analysis.momentum_weights {
        if !analysis.change_horizons.contains(&w.horizon) {
            return Err(invalid(format!(
                "analysis.momentum_weights: horizon {} is not in change_horizons",
                w.horizon
            )));
        }
        if !(w.weight.is_finite() && w.weight > 0.0) {
            return Err(invalid(format!(
                "analysis.momentum_weights: weight for horizon {} must be > 0",
                w.horizon
            )));
        }
    }
    if !analysis.change_horizons.contains(&analysis.ranking_horizon) {
        return Err(invalid(format!(
            "analysis.ranking_horizon {} is not in change_horizons",
            analysis.ranking_horizon
        )));
    }
    Ok(())
}
