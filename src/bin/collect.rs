use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crypto_scanner::analyzer::{extract_prices, is_crypto_market, market_id};
use crypto_scanner::config::{Config, MAX_HISTORY_POINTS};
use crypto_scanner::error::Result;
use crypto_scanner::fetcher::{
    fetch_markets, http_client, now_millis, parse_iso_to_unix_millis, utc_now_iso, value_as_f64,
};
use crypto_scanner::store::HistoryStore;
use crypto_scanner::types::RunSummary;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!("Collecting history snapshots for crypto markets...");
    let client = http_client()?;
    let markets = fetch_markets(&cfg, &client).await?;

    let crypto: Vec<&Value> = markets.iter().filter(|m| is_crypto_market(m)).collect();
    info!("Found {} crypto markets", crypto.len());

    let store = HistoryStore::open(&cfg.history_dir)?;
    let mut collected = 0usize;

    for market in &crypto {
        let Some(id) = market_id(market) else { continue };
        // Markets without a cleanly decodable nonzero price pair are skipped,
        // never stored with placeholder values.
        let Some((yes, no)) = extract_prices(market) else {
            continue;
        };

        let volume = market.get("volume").and_then(value_as_f64).unwrap_or(0.0);
        let timestamp_ms = market
            .get("updatedAt")
            .and_then(Value::as_str)
            .and_then(parse_iso_to_unix_millis)
            .unwrap_or_else(now_millis);

        match store.append(&id, yes, no, volume, timestamp_ms) {
            Ok(count) => {
                let question = market.get("question").and_then(Value::as_str).unwrap_or("?");
                info!("[COLLECT] {}... ({count} points)", truncate(question, 40));
                collected += 1;
            }
            // One market's write failure must not sink the rest of the run
            Err(e) => warn!("[COLLECT] failed to persist snapshot for {id}: {e}"),
        }
    }

    let summary = RunSummary {
        generated_at: utc_now_iso(),
        total_markets: collected,
        historical_dir: cfg.history_dir.clone(),
        max_points: MAX_HISTORY_POINTS,
    };
    std::fs::write(&cfg.summary_path, serde_json::to_string_pretty(&summary)?)?;

    info!(
        "Collected {} markets — up to {} points each in {}/",
        collected, MAX_HISTORY_POINTS, cfg.history_dir
    );
    Ok(())
}

/// Char-safe prefix for log lines.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
