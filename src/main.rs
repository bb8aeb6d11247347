use futures_util::future::join_all;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crypto_scanner::analyzer::{analyze_market, is_crypto_market};
use crypto_scanner::config::{Config, CANDLE_FETCH_LIMIT};
use crypto_scanner::error::Result;
use crypto_scanner::fetcher::{fetch_candles, fetch_markets, http_client, now_millis, utc_now_iso};
use crypto_scanner::report::{select_opportunities, write_analysis};
use crypto_scanner::store::HistoryStore;
use crypto_scanner::types::{Analysis, AnalysisDocument, FilterThresholds};

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
    let client = http_client()?;
    let markets = fetch_markets(&cfg, &client).await?;

    let crypto: Vec<&Value> = markets.iter().filter(|m| is_crypto_market(m)).collect();
    info!(
        "[FILTER] {} of {} markets are crypto-related",
        crypto.len(),
        markets.len()
    );

    let now_ms = now_millis();
    let mut analyzed: Vec<Analysis> = crypto
        .iter()
        .filter_map(|m| analyze_market(m, now_ms))
        .collect();
    info!(
        "[ANALYZE] {} of {} crypto markets classified",
        analyzed.len(),
        crypto.len()
    );

    // Candle enrichment: one fetch per symbol-bearing market, issued
    // concurrently. Each result lands in its own slot; a failed fetch
    // leaves that market without candles and touches nothing else.
    let targets: Vec<(usize, String)> = analyzed
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.crypto_symbol.clone().map(|s| (i, s)))
        .collect();
    info!("[CANDLES] fetching {} symbol feeds", targets.len());

    let fetches = targets.into_iter().map(|(i, symbol)| {
        let client = client.clone();
        let cfg = cfg.clone();
        async move {
            let candles = fetch_candles(&cfg, &client, &symbol, CANDLE_FETCH_LIMIT).await;
            (i, candles)
        }
    });
    for (i, candles) in join_all(fetches).await {
        analyzed[i].candle_data = candles;
    }

    // History enrichment from the snapshot store.
    let store = HistoryStore::open(&cfg.history_dir)?;
    for analysis in &mut analyzed {
        let history = store.load(&analysis.id);
        analysis.history_points = history.len();
        if !history.is_empty() {
            analysis.history = Some(history);
        }
    }

    let filters = FilterThresholds {
        min_spread: cfg.min_spread,
        max_spread: cfg.max_spread,
        min_volume: cfg.min_volume,
    };
    let opportunities = select_opportunities(analyzed, &filters, cfg.require_history);
    info!(
        "Found {} opportunities with spread {:.1}%-{:.1}% and volume >= ${:.0}",
        opportunities.len(),
        filters.min_spread * 100.0,
        filters.max_spread * 100.0,
        filters.min_volume,
    );

    let doc = AnalysisDocument {
        generated_at: utc_now_iso(),
        total_count: opportunities.len(),
        filters,
        opportunities,
    };
    write_analysis(&cfg.data_path, &doc)?;
    info!("Wrote {} opportunities to {}", doc.total_count, cfg.data_path);

    Ok(())
}
