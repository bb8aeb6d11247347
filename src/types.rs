use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sides and signals
// ---------------------------------------------------------------------------

/// Which outcome is priced below the 0.50 uncertainty baseline.
/// YES is checked first; BALANCED means neither side is below 0.50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
    Balanced,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Side::Yes => "YES",
            Side::No => "NO",
            Side::Balanced => "BALANCED",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Signal {
    /// Derive the signal from the underpriced outcome price. Buy-polarity
    /// when YES is underpriced, sell-polarity when NO is, NEUTRAL otherwise.
    pub fn from_underpriced(price: f64, side: Side) -> Signal {
        use crate::config::signal_thresholds::{MODERATE, STRONG};
        match side {
            Side::Yes => {
                if price < STRONG {
                    Signal::StrongBuy
                } else if price < MODERATE {
                    Signal::Buy
                } else {
                    Signal::Neutral
                }
            }
            Side::No => {
                if price < STRONG {
                    Signal::StrongSell
                } else if price < MODERATE {
                    Signal::Sell
                } else {
                    Signal::Neutral
                }
            }
            Side::Balanced => Signal::Neutral,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::Buy => "BUY",
            Signal::Neutral => "NEUTRAL",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG_SELL",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Analysis — one classified market, the unit the report is built from
// ---------------------------------------------------------------------------

/// Field names follow the JSON consumed by the report template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    pub question: String,
    pub category: String,
    pub yes: f64,
    pub no: f64,
    pub yes_spread: f64,
    pub no_spread: f64,
    pub max_spread: f64,
    pub underpriced_side: Side,
    pub underpriced_price: f64,
    pub signal: Signal,
    pub volume: f64,
    pub liquidity: f64,
    pub updated_at: Option<String>,
    /// Milliseconds until market end, floored at 0. 0 also means "no end
    /// date" — such markets are treated as expired, not open-ended.
    pub time_left: i64,
    pub market_url: String,
    pub crypto_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_duration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candle_data: Option<Vec<Candle>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryPoint>>,
    #[serde(default)]
    pub history_points: usize,
}

/// One Binance kline, decoded from the fixed-position tuple form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, epoch milliseconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One stored price snapshot. The owning market id is implicit in the file
/// the point lives in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Unix timestamp, whole seconds.
    pub t: i64,
    pub yes: f64,
    pub no: f64,
    /// Total market volume at snapshot time, 0 when unreported.
    pub v: f64,
}

// ---------------------------------------------------------------------------
// Persisted documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterThresholds {
    pub min_spread: f64,
    pub max_spread: f64,
    pub min_volume: f64,
}

/// The hand-off artifact written by the scanner and consumed by render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDocument {
    pub generated_at: String,
    pub total_count: usize,
    pub filters: FilterThresholds,
    pub opportunities: Vec<Analysis>,
}

/// Informational summary written after each collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub generated_at: String,
    pub total_markets: usize,
    pub historical_dir: String,
    pub max_points: usize,
}
