use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::config::MAX_HISTORY_POINTS;
use crate::error::Result;
use crate::types::HistoryPoint;

/// Durable per-market price history: one pretty-printed JSON array per
/// market id, capped at `MAX_HISTORY_POINTS` entries, oldest first.
///
/// Single writer per market is assumed. Appends rewrite the whole file, so
/// concurrent collection runs against the same directory are last-writer-wins.
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Opens the store, creating the directory if it doesn't exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, market_id: &str) -> PathBuf {
        self.dir.join(format!("{market_id}.json"))
    }

    /// The stored sequence for a market, oldest → newest. A missing file,
    /// an unreadable file, and non-array content all read as empty history —
    /// this never fails.
    pub fn load(&self, market_id: &str) -> Vec<HistoryPoint> {
        let path = self.path_for(market_id);
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<Vec<HistoryPoint>>(&raw) {
            Ok(points) => points,
            Err(e) => {
                warn!("[HISTORY] discarding unparseable history for {market_id}: {e}");
                Vec::new()
            }
        }
    }

    /// Appends one snapshot, trims to the retention cap (dropping the oldest
    /// entries), rewrites the file, and returns the new length.
    ///
    /// `timestamp_ms` is stored as whole seconds. A write failure propagates;
    /// it is fatal only for this market's append, and collection callers are
    /// expected to continue with the rest of the batch.
    pub fn append(
        &self,
        market_id: &str,
        yes: f64,
        no: f64,
        volume: f64,
        timestamp_ms: i64,
    ) -> Result<usize> {
        let mut history = self.load(market_id);
        history.push(HistoryPoint {
            t: timestamp_ms.div_euclid(1000),
            yes,
            no,
            v: volume,
        });
        if history.len() > MAX_HISTORY_POINTS {
            let excess = history.len() - MAX_HISTORY_POINTS;
            history.drain(..excess);
        }
        fs::write(
            self.path_for(market_id),
            serde_json::to_string_pretty(&history)?,
        )?;
        Ok(history.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::open(dir.path().join("hist")).expect("store should open")
    }

    #[test]
    fn missing_history_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        assert!(store.load("nothing-here").is_empty());
    }

    #[test]
    fn append_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        let len = store.append("m1", 0.47, 0.53, 50_000.0, 1_700_000_000_500).unwrap();
        assert_eq!(len, 1);

        let points = store.load("m1");
        assert_eq!(points.len(), 1);
        // Millisecond timestamps are floored to whole seconds
        assert_eq!(points[0].t, 1_700_000_000);
        assert!((points[0].yes - 0.47).abs() < 1e-9);
        assert!((points[0].no - 0.53).abs() < 1e-9);
        assert!((points[0].v - 50_000.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_appends_both_stored() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.append("m1", 0.5, 0.5, 0.0, 1_000_000).unwrap();
        let len = store.append("m1", 0.5, 0.5, 0.0, 1_000_000).unwrap();
        assert_eq!(len, 2);
        assert_eq!(store.load("m1").len(), 2);
    }

    #[test]
    fn retention_cap_drops_oldest_keeps_newest_last() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);

        for i in 0..MAX_HISTORY_POINTS {
            store.append("m1", 0.5, 0.5, 0.0, (i as i64) * 1000).unwrap();
        }
        assert_eq!(store.load("m1").len(), MAX_HISTORY_POINTS);

        // One past the cap: oldest (t=0) is dropped, new point lands last
        let len = store
            .append("m1", 0.6, 0.4, 1.0, (MAX_HISTORY_POINTS as i64) * 1000)
            .unwrap();
        assert_eq!(len, MAX_HISTORY_POINTS);

        let points = store.load("m1");
        assert_eq!(points.len(), MAX_HISTORY_POINTS);
        assert_eq!(points[0].t, 1);
        assert_eq!(points.last().unwrap().t, MAX_HISTORY_POINTS as i64);
        assert!((points.last().unwrap().yes - 0.6).abs() < 1e-9);
    }

    #[test]
    fn append_preserves_insertion_order() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        for t in [3_000, 1_000, 2_000] {
            store.append("m1", 0.5, 0.5, 0.0, t).unwrap();
        }
        let ts: Vec<i64> = store.load("m1").iter().map(|p| p.t).collect();
        // Insertion order, not timestamp order
        assert_eq!(ts, vec![3, 1, 2]);
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_recoverable() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.append("m1", 0.5, 0.5, 0.0, 1_000).unwrap();

        fs::write(dir.path().join("hist/m1.json"), "{not json").unwrap();
        assert!(store.load("m1").is_empty());

        // The next append starts a fresh sequence over the corrupt file
        let len = store.append("m1", 0.4, 0.6, 0.0, 2_000).unwrap();
        assert_eq!(len, 1);
    }

    #[test]
    fn non_array_content_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        fs::write(dir.path().join("hist/m1.json"), "{\"t\": 1}").unwrap();
        assert!(store.load("m1").is_empty());
    }

    #[test]
    fn markets_are_isolated() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.append("m1", 0.5, 0.5, 0.0, 1_000).unwrap();
        store.append("m2", 0.4, 0.6, 0.0, 2_000).unwrap();
        assert_eq!(store.load("m1").len(), 1);
        assert_eq!(store.load("m2").len(), 1);
        assert_eq!(store.load("m1")[0].t, 1);
        assert_eq!(store.load("m2")[0].t, 2);
    }
}
