//! JSON-file decision log adapter.
//!
//! The full history lives in one JSON array at a well-known path. `append`
//! is a read-modify-write cycle: load, push, stable-sort by timestamp, write
//! to a temporary file, then atomically rename over the durable file. A
//! crash mid-write leaves readers with either the old or the new complete
//! version, never a partial one. The whole cycle runs under a writer mutex
//! so concurrent appends cannot drop each other's records.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::error::QuantsigError;
use crate::domain::history::HistoryRecord;
use crate::ports::history_port::HistoryPort;

pub struct JsonHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_records(&self) -> Vec<HistoryRecord> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history file unreadable, treating as empty");
                return Vec::new();
            }
        };

        if bytes.is_empty() {
            return Vec::new();
        }

        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history file corrupted, starting new history");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl HistoryPort for JsonHistoryStore {
    async fn append(&self, record: HistoryRecord) -> Result<(), QuantsigError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records().await;
        records.push(record);
        // Stable sort: ties keep prior relative order.
        records.sort_by_key(|r| r.timestamp);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<HistoryRecord>, QuantsigError> {
        Ok(self.read_records().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::{DataSource, Signal};
    use chrono::{TimeZone, Utc};

    fn record(symbol: &str, hour: u32) -> HistoryRecord {
        HistoryRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
            symbol: symbol.to_string(),
            action: Signal::Hold,
            price: 100.0,
            confidence: 55,
            rationale: "consolidating".to_string(),
            commentary: None,
            data_source: DataSource::Mock,
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        store.append(record("AAPL", 10)).await.unwrap();
        store.append(record("TSLA", 11)).await.unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol, "AAPL");
        assert_eq!(records[1].symbol, "TSLA");
    }

    #[tokio::test]
    async fn appends_keep_history_sorted_by_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        store.append(record("LATE", 15)).await.unwrap();
        store.append(record("EARLY", 9)).await.unwrap();
        store.append(record("MID", 12)).await.unwrap();

        let records = store.load_all().await.unwrap();
        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["EARLY", "MID", "LATE"]);
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn corrupted_file_loads_empty_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, b"{not json at all").await.unwrap();

        let store = JsonHistoryStore::new(&path);
        assert!(store.load_all().await.unwrap().is_empty());

        // The next append starts a fresh, valid history.
        store.append(record("AAPL", 10)).await.unwrap();
        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = JsonHistoryStore::new(&path);
        store.append(record("AAPL", 10)).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
