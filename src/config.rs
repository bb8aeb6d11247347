use crate::error::{AppError, Result};

pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
pub const BINANCE_API_URL: &str = "https://api.binance.com";

/// Markets requested per GAMMA listing call.
pub const MARKET_FETCH_LIMIT: usize = 500;

/// Kline interval requested from Binance.
pub const CANDLE_INTERVAL: &str = "15m";

/// Klines requested per symbol.
pub const CANDLE_FETCH_LIMIT: usize = 100;

/// Snapshots retained per market — 24 hours of 15-minute collection runs.
/// A history file never holds more than this many points; the oldest entry
/// is dropped on every append past the cap.
pub const MAX_HISTORY_POINTS: usize = 96;

/// The literal token the report template carries exactly once. Rendering
/// replaces its first occurrence with the serialized opportunity array.
pub const REPORT_PLACEHOLDER: &str = "%OPPORTUNITIES_JSON%";

/// Markets whose start→end window is at most this many hours are flagged
/// short-duration in the report.
pub const SHORT_DURATION_MAX_HOURS: f64 = 24.0;

/// Signal thresholds on the underpriced outcome price.
/// Below STRONG → STRONG_BUY / STRONG_SELL, below MODERATE → BUY / SELL.
pub mod signal_thresholds {
    pub const STRONG: f64 = 0.48;
    pub const MODERATE: f64 = 0.49;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gamma_api_url: String,
    pub binance_api_url: String,
    pub log_level: String,
    /// Directory holding one history file per market id (HISTORY_DIR)
    pub history_dir: String,
    /// Analysis document written by the scanner, read by render (DATA_PATH)
    pub data_path: String,
    /// HTML report template, rewritten in place by render (REPORT_PATH)
    pub report_path: String,
    /// Collection run summary path (SUMMARY_PATH)
    pub summary_path: String,
    /// Minimum max-spread for a published opportunity (MIN_SPREAD)
    pub min_spread: f64,
    /// Maximum max-spread for a published opportunity (MAX_SPREAD)
    pub max_spread: f64,
    /// Minimum total volume in USD (MIN_VOLUME)
    pub min_volume: f64,
    /// Require at least one stored history point per opportunity (REQUIRE_HISTORY)
    pub require_history: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            gamma_api_url: std::env::var("GAMMA_API_URL")
                .unwrap_or_else(|_| GAMMA_API_URL.to_string()),
            binance_api_url: std::env::var("BINANCE_API_URL")
                .unwrap_or_else(|_| BINANCE_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            history_dir: std::env::var("HISTORY_DIR").unwrap_or_else(|_| "historical".to_string()),
            data_path: std::env::var("DATA_PATH").unwrap_or_else(|_| "data.json".to_string()),
            report_path: std::env::var("REPORT_PATH").unwrap_or_else(|_| "index.html".to_string()),
            summary_path: std::env::var("SUMMARY_PATH")
                .unwrap_or_else(|_| "history-summary.json".to_string()),
            min_spread: std::env::var("MIN_SPREAD")
                .unwrap_or_else(|_| "0.015".to_string())
                .parse::<f64>()
                .map_err(|_| AppError::Config("MIN_SPREAD must be a number".to_string()))?,
            max_spread: std::env::var("MAX_SPREAD")
                .unwrap_or_else(|_| "0.50".to_string())
                .parse::<f64>()
                .map_err(|_| AppError::Config("MAX_SPREAD must be a number".to_string()))?,
            min_volume: std::env::var("MIN_VOLUME")
                .unwrap_or_else(|_| "10000".to_string())
                .parse::<f64>()
                .unwrap_or(10_000.0),
            require_history: std::env::var("REQUIRE_HISTORY")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}
