use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::{info, warn};

use crate::config::{Config, CANDLE_INTERVAL, MARKET_FETCH_LIMIT};
use crate::error::{AppError, Result};
use crate::types::Candle;

pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Fetch active markets from the GAMMA REST API.
///
/// The endpoint normally returns a JSON array, but some deployments wrap it
/// in an object with a `markets` or `data` field — both shapes are accepted.
/// A non-success status aborts the whole run; there is no fallback listing.
pub async fn fetch_markets(cfg: &Config, client: &reqwest::Client) -> Result<Vec<Value>> {
    let url = format!(
        "{}/markets?active=true&closed=false&limit={}",
        cfg.gamma_api_url, MARKET_FETCH_LIMIT
    );
    info!("Fetching markets from {url}");

    let resp = client.get(&url).send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let excerpt: String = body.chars().take(200).collect();
        warn!("GAMMA /markets returned HTTP {status}: {excerpt}");
        return Err(AppError::Fetch(format!(
            "GAMMA /markets returned HTTP {status}"
        )));
    }

    let parsed: Value = serde_json::from_str(&body)?;
    let items = match parsed {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("markets").or_else(|| obj.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AppError::Fetch(
                    "GAMMA /markets response was not an array".to_string(),
                ))
            }
        },
        _ => {
            return Err(AppError::Fetch(
                "GAMMA /markets response was not an array".to_string(),
            ))
        }
    };

    let total = items.len();
    let markets: Vec<Value> = items
        .into_iter()
        .filter(|m| {
            let active = m.get("active").and_then(Value::as_bool) == Some(true);
            let open = m.get("closed").and_then(Value::as_bool) == Some(false);
            active || open
        })
        .collect();

    info!("Fetched {} markets ({} active)", total, markets.len());
    Ok(markets)
}

/// Fetch 15-minute klines for one symbol from Binance.
///
/// Any failure — transport, status, payload shape — is logged and yields
/// None so one bad symbol never poisons the rest of the batch. Rows that
/// don't decode as a kline tuple are skipped individually.
pub async fn fetch_candles(
    cfg: &Config,
    client: &reqwest::Client,
    symbol: &str,
    limit: usize,
) -> Option<Vec<Candle>> {
    let url = format!(
        "{}/api/v3/klines?symbol={}&interval={}&limit={}",
        cfg.binance_api_url, symbol, CANDLE_INTERVAL, limit
    );

    let resp = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("[CANDLES] HTTP error for {symbol}: {e}");
            return None;
        }
    };
    if !resp.status().is_success() {
        warn!("[CANDLES] {symbol} returned HTTP {}", resp.status());
        return None;
    }

    let rows: Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => {
            warn!("[CANDLES] JSON parse error for {symbol}: {e}");
            return None;
        }
    };
    let rows = match rows.as_array() {
        Some(a) => a,
        None => {
            warn!("[CANDLES] {symbol} kline response was not an array");
            return None;
        }
    };

    Some(rows.iter().filter_map(parse_kline_row).collect())
}

/// Decode one Binance kline tuple:
/// `[open_time, open, high, low, close, volume, ...]` — time is an integer
/// epoch in milliseconds, the price and volume fields are decimal strings.
pub fn parse_kline_row(row: &Value) -> Option<Candle> {
    let fields = row.as_array()?;
    Some(Candle {
        time: fields.first()?.as_i64()?,
        open: fields.get(1).and_then(value_as_f64)?,
        high: fields.get(2).and_then(value_as_f64)?,
        low: fields.get(3).and_then(value_as_f64)?,
        close: fields.get(4).and_then(value_as_f64)?,
        volume: fields.get(5).and_then(value_as_f64)?,
    })
}

/// Coerce a JSON number or decimal-string field to f64. GAMMA reports
/// volume/liquidity either way depending on the endpoint.
pub fn value_as_f64(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// RFC 3339 UTC stamp for generated documents.
pub fn utc_now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 / ISO 8601 UTC timestamp string to Unix milliseconds.
/// Accepts bare dates (`2026-03-01`), full timestamps, trailing `Z`,
/// fractional seconds, and offsets — sub-second precision is discarded.
pub fn parse_iso_to_unix_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    let s = s.strip_suffix('Z').unwrap_or(s);
    let s = if let Some(dot) = s.find('.') { &s[..dot] } else { s };
    let s = if s.len() > 19 {
        let b = s.as_bytes()[19];
        if b == b'+' || b == b'-' { &s[..19] } else { s }
    } else {
        s
    };
    let (year, month, day, hour, minute, second): (i64, i64, i64, i64, i64, i64) =
        if s.len() == 10 {
            (s[0..4].parse().ok()?, s[5..7].parse().ok()?, s[8..10].parse().ok()?, 0, 0, 0)
        } else if s.len() >= 19 {
            (s[0..4].parse().ok()?, s[5..7].parse().ok()?, s[8..10].parse().ok()?,
             s[11..13].parse().ok()?, s[14..16].parse().ok()?, s[17..19].parse().ok()?)
        } else {
            return None;
        };

    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    let jdn = day + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045;
    let unix_days = jdn - 2_440_588;
    Some((unix_days * 86400 + hour * 3600 + minute * 60 + second) * 1000)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
