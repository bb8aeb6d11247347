use serde_json::Value;

use crate::analyzer::symbols::extract_symbol;
use crate::config::SHORT_DURATION_MAX_HOURS;
use crate::fetcher::{parse_iso_to_unix_millis, value_as_f64};
use crate::types::{Analysis, Side, Signal};

/// Decode the `outcomePrices` field into per-side raw prices.
///
/// The field is either a two-element array of decimal strings (or numbers)
/// or a string encoding such an array. Returns None when the field is absent
/// or the container doesn't decode; element-level failures surface as None
/// inside the pair so each caller can apply its own tolerance.
fn decode_outcome_prices(market: &Value) -> Option<(Option<f64>, Option<f64>)> {
    let raw = market.get("outcomePrices")?;
    let decoded;
    let prices = match raw {
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s).ok()?;
            &decoded
        }
        other => other,
    };
    let arr = prices.as_array()?;
    Some((
        arr.first().and_then(value_as_f64),
        arr.get(1).and_then(value_as_f64),
    ))
}

/// Collector entry point: both sides must decode to a nonzero price,
/// otherwise the market is skipped entirely. A zero price here means "no
/// market", and a half-decoded pair must never reach the history store.
pub fn extract_prices(market: &Value) -> Option<(f64, f64)> {
    let (yes, no) = decode_outcome_prices(market)?;
    let yes = yes.filter(|p| *p != 0.0)?;
    let no = no.filter(|p| *p != 0.0)?;
    Some((yes, no))
}

/// Analyzer entry point: unparseable elements degrade to 0.0, then a market
/// with both sides at 0 is rejected rather than treated as a valid 50/50.
fn analyzed_prices(market: &Value) -> Option<(f64, f64)> {
    let (yes, no) = decode_outcome_prices(market)?;
    let (yes, no) = (yes.unwrap_or(0.0), no.unwrap_or(0.0));
    if yes == 0.0 && no == 0.0 {
        return None;
    }
    Some((yes, no))
}

/// Stable market identifier — GAMMA serves it as a string, older payloads
/// as a number.
pub fn market_id(market: &Value) -> Option<String> {
    match market.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Batch-level crypto filter over a raw market record: normalized question
/// plus first event slug against the broad keyword set.
pub fn is_crypto_market(market: &Value) -> bool {
    let question = market.get("question").and_then(Value::as_str).unwrap_or("");
    crate::analyzer::symbols::is_crypto_related(question, event_slug(market))
}

fn event_slug(market: &Value) -> Option<&str> {
    market
        .get("events")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(|e| e.get("slug"))
        .and_then(Value::as_str)
}

fn end_millis(market: &Value) -> Option<i64> {
    market
        .get("endDateIso")
        .and_then(Value::as_str)
        .and_then(parse_iso_to_unix_millis)
        .or_else(|| {
            market
                .get("endDate")
                .and_then(Value::as_str)
                .and_then(parse_iso_to_unix_millis)
        })
}

fn start_millis(market: &Value) -> Option<i64> {
    market
        .get("startDateIso")
        .and_then(Value::as_str)
        .and_then(parse_iso_to_unix_millis)
        .or_else(|| {
            market
                .get("startDate")
                .and_then(Value::as_str)
                .and_then(parse_iso_to_unix_millis)
        })
}

/// Milliseconds until the market ends, floored at 0. A market with no end
/// date yields 0 and is treated as expired, not open-ended.
pub fn time_left_ms(market: &Value, now_ms: i64) -> i64 {
    end_millis(market)
        .map(|end| (end - now_ms).max(0))
        .unwrap_or(0)
}

/// Classify one raw GAMMA market into an `Analysis`, or None when the record
/// is unusable (no id, undecodable prices, or a dead both-sides-zero book).
/// Candle and history enrichment are left empty for the caller to fill.
pub fn analyze_market(market: &Value, now_ms: i64) -> Option<Analysis> {
    let id = market_id(market)?;
    let (yes, no) = analyzed_prices(market)?;

    let question = market
        .get("question")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let yes_spread = (yes - 0.5).abs();
    let no_spread = (no - 0.5).abs();
    let max_spread = yes_spread.max(no_spread);

    let underpriced_side = if yes < 0.5 {
        Side::Yes
    } else if no < 0.5 {
        Side::No
    } else {
        Side::Balanced
    };
    let underpriced_price = if underpriced_side == Side::Yes { yes } else { no };

    let slug = event_slug(market);
    let market_url = match (slug, market.get("slug").and_then(Value::as_str)) {
        (Some(event), Some(market_slug)) => {
            format!("https://polymarket.com/event/{event}/{market_slug}")
        }
        _ => format!("https://polymarket.com/market/{id}"),
    };

    let duration_hours = match (start_millis(market), end_millis(market)) {
        (Some(start), Some(end)) if end > start => {
            Some((end - start) as f64 / 3_600_000.0)
        }
        _ => None,
    };

    Some(Analysis {
        crypto_symbol: extract_symbol(&question, slug).map(str::to_string),
        signal: Signal::from_underpriced(underpriced_price, underpriced_side),
        question,
        category: "Crypto".to_string(),
        yes,
        no,
        yes_spread,
        no_spread,
        max_spread,
        underpriced_side,
        underpriced_price,
        volume: market.get("volume").and_then(value_as_f64).unwrap_or(0.0),
        liquidity: market.get("liquidity").and_then(value_as_f64).unwrap_or(0.0),
        updated_at: market
            .get("updatedAt")
            .and_then(Value::as_str)
            .map(str::to_string),
        time_left: time_left_ms(market, now_ms),
        market_url,
        short_duration: duration_hours.map(|h| h <= SHORT_DURATION_MAX_HOURS),
        duration_hours,
        candle_data: None,
        history: None,
        history_points: 0,
        id,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
