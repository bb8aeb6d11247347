use std::fs;

use tracing::{info, warn};

use crate::config::REPORT_PLACEHOLDER;
use crate::error::Result;
use crate::types::{Analysis, AnalysisDocument, FilterThresholds};

/// Select and order the published opportunity set.
///
/// The strict pass keeps records with an extractable symbol, a max spread
/// inside the configured band, enough volume, and time left on the clock.
/// When nothing qualifies but the batch is non-empty, the whole batch is
/// published instead so the report is never silently empty. Either way the
/// result is sorted ascending by max spread (ties stay in batch order).
pub fn select_opportunities(
    batch: Vec<Analysis>,
    filters: &FilterThresholds,
    require_history: bool,
) -> Vec<Analysis> {
    let batch_len = batch.len();
    let (mut selected, rest): (Vec<Analysis>, Vec<Analysis>) = batch
        .into_iter()
        .partition(|a| passes(a, filters, require_history));

    if selected.is_empty() && !rest.is_empty() {
        warn!(
            "No opportunities passed filters — publishing all {batch_len} analyzed markets"
        );
        selected = rest;
    }

    selected.sort_by(|a, b| a.max_spread.total_cmp(&b.max_spread));
    selected
}

fn passes(a: &Analysis, f: &FilterThresholds, require_history: bool) -> bool {
    a.crypto_symbol.is_some()
        && a.max_spread >= f.min_spread
        && a.max_spread <= f.max_spread
        && a.volume >= f.min_volume
        && a.time_left > 0
        && (!require_history || a.history_points > 0)
}

pub fn write_analysis(path: &str, doc: &AnalysisDocument) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(doc)?)?;
    Ok(())
}

pub fn load_analysis(path: &str) -> Result<AnalysisDocument> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Substitute the serialized opportunity array into the report template and
/// rewrite it in place. Only the first placeholder occurrence is replaced;
/// a template with no placeholder left (already rendered) is a no-op.
pub fn render_report(template_path: &str, opportunities: &[Analysis]) -> Result<()> {
    let html = fs::read_to_string(template_path)?;
    if !html.contains(REPORT_PLACEHOLDER) {
        info!("Template at {template_path} has no {REPORT_PLACEHOLDER} placeholder — nothing to do");
        return Ok(());
    }
    let rendered = html.replacen(REPORT_PLACEHOLDER, &serde_json::to_string(opportunities)?, 1);
    fs::write(template_path, rendered)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Side, Signal};

    fn thresholds() -> FilterThresholds {
        FilterThresholds {
            min_spread: 0.015,
            max_spread: 0.50,
            min_volume: 10_000.0,
        }
    }

    fn analysis(id: &str, max_spread: f64, volume: f64, time_left: i64) -> Analysis {
        Analysis {
            id: id.to_string(),
            question: format!("market {id}"),
            category: "Crypto".to_string(),
            yes: 0.5 - max_spread,
            no: 0.5 + max_spread,
            yes_spread: max_spread,
            no_spread: max_spread,
            max_spread,
            underpriced_side: Side::Yes,
            underpriced_price: 0.5 - max_spread,
            signal: Signal::Neutral,
            volume,
            liquidity: 0.0,
            updated_at: None,
            time_left,
            market_url: format!("https://polymarket.com/market/{id}"),
            crypto_symbol: Some("BTCUSDT".to_string()),
            duration_hours: None,
            short_duration: None,
            candle_data: None,
            history: None,
            history_points: 0,
        }
    }

    #[test]
    fn strict_filter_keeps_qualifying_records() {
        let batch = vec![
            analysis("pass", 0.03, 50_000.0, 1_000),
            analysis("thin", 0.03, 500.0, 1_000),
            analysis("expired", 0.03, 50_000.0, 0),
            analysis("wide", 0.60, 50_000.0, 1_000),
        ];
        let out = select_opportunities(batch, &thresholds(), false);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "pass");
    }

    #[test]
    fn missing_symbol_fails_strict_filter() {
        let mut no_symbol = analysis("nosym", 0.03, 50_000.0, 1_000);
        no_symbol.crypto_symbol = None;
        let keeper = analysis("pass", 0.04, 50_000.0, 1_000);
        let out = select_opportunities(vec![no_symbol, keeper], &thresholds(), false);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "pass");
    }

    #[test]
    fn empty_strict_pass_falls_back_to_whole_batch() {
        let batch = vec![
            analysis("a", 0.30, 100.0, 0),
            analysis("b", 0.10, 100.0, 0),
            analysis("c", 0.20, 100.0, 0),
        ];
        let out = select_opportunities(batch, &thresholds(), false);
        // All three published, sorted ascending by max_spread
        let ids: Vec<&str> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn empty_batch_stays_empty() {
        assert!(select_opportunities(Vec::new(), &thresholds(), false).is_empty());
    }

    #[test]
    fn sort_is_ascending_by_max_spread() {
        let batch = vec![
            analysis("wide", 0.30, 50_000.0, 1_000),
            analysis("tight", 0.02, 50_000.0, 1_000),
            analysis("mid", 0.10, 50_000.0, 1_000),
        ];
        let out = select_opportunities(batch, &thresholds(), false);
        let ids: Vec<&str> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["tight", "mid", "wide"]);
    }

    #[test]
    fn history_gate_applies_only_when_enabled() {
        let mut with_history = analysis("hist", 0.03, 50_000.0, 1_000);
        with_history.history_points = 4;
        let without = analysis("fresh", 0.04, 50_000.0, 1_000);

        let gated = select_opportunities(
            vec![with_history.clone(), without.clone()],
            &thresholds(),
            true,
        );
        assert_eq!(gated.len(), 1);
        assert_eq!(gated[0].id, "hist");

        let ungated = select_opportunities(vec![with_history, without], &thresholds(), false);
        assert_eq!(ungated.len(), 2);
    }

    #[test]
    fn render_substitutes_first_placeholder_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        fs::write(
            &path,
            "<script>const data = %OPPORTUNITIES_JSON%;</script><p>%OPPORTUNITIES_JSON%</p>",
        )
        .unwrap();

        let ops = vec![analysis("m1", 0.03, 50_000.0, 1_000)];
        render_report(path.to_str().unwrap(), &ops).unwrap();

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("\"maxSpread\":0.03"));
        // Second occurrence is left untouched
        assert!(html.contains("<p>%OPPORTUNITIES_JSON%</p>"));
    }

    #[test]
    fn render_without_placeholder_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, "<html>already rendered</html>").unwrap();

        render_report(path.to_str().unwrap(), &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<html>already rendered</html>"
        );
    }

    #[test]
    fn analysis_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let doc = AnalysisDocument {
            generated_at: "2026-01-01T00:00:00.000Z".to_string(),
            total_count: 1,
            filters: thresholds(),
            opportunities: vec![analysis("m1", 0.03, 50_000.0, 1_000)],
        };
        write_analysis(path.to_str().unwrap(), &doc).unwrap();

        let loaded = load_analysis(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.total_count, 1);
        assert_eq!(loaded.opportunities[0].id, "m1");
        assert_eq!(loaded.opportunities[0].crypto_symbol.as_deref(), Some("BTCUSDT"));
    }
}
