//! Atomic run counters with JSON persistence.

use crate::core::{ClassificationResult, SignalState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Counters for the current process.
#[derive(Debug)]
pub struct RunLog {
    /// Ticks classified
    ticks: AtomicU64,
    /// Ticks the outlier model flagged
    outlier_ticks: AtomicU64,
    red_ticks: AtomicU64,
    green_ticks: AtomicU64,
    blue_ticks: AtomicU64,
    /// Feature rows written by the recorder
    rows_recorded: AtomicU64,
    run_id: Uuid,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            outlier_ticks: AtomicU64::new(0),
            red_ticks: AtomicU64::new(0),
            green_ticks: AtomicU64::new(0),
            blue_ticks: AtomicU64::new(0),
            rows_recorded: AtomicU64::new(0),
            run_id: Uuid::new_v4(),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a log that starts from, and saves back to, `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!("could not load previous run stats: {e}");
        }

        log
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record one classified tick and the state it produced.
    pub fn record_tick(&self, result: &ClassificationResult, state: SignalState) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if result.outlier.is_outlier() {
            self.outlier_ticks.fetch_add(1, Ordering::Relaxed);
        }
        let counter = match state {
            SignalState::Red => &self.red_ticks,
            SignalState::Green => &self.green_ticks,
            SignalState::Blue => &self.blue_ticks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record rows written by the recorder.
    pub fn record_rows(&self, count: u64) {
        self.rows_recorded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            run_id: self.run_id,
            ticks: self.ticks.load(Ordering::Relaxed),
            outlier_ticks: self.outlier_ticks.load(Ordering::Relaxed),
            red_ticks: self.red_ticks.load(Ordering::Relaxed),
            green_ticks: self.green_ticks.load(Ordering::Relaxed),
            blue_ticks: self.blue_ticks.load(Ordering::Relaxed),
            rows_recorded: self.rows_recorded.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Run Statistics ({}):\n\
             - Ticks classified: {}\n\
             - Outlier ticks: {}\n\
             - RED / GREEN / BLUE ticks: {} / {} / {}\n\
             - Feature rows recorded: {}\n\
             - Session duration: {} seconds",
            stats.run_id,
            stats.ticks,
            stats.outlier_ticks,
            stats.red_ticks,
            stats.green_ticks,
            stats.blue_ticks,
            stats.rows_recorded,
            stats.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                ticks: stats.ticks,
                outlier_ticks: stats.outlier_ticks,
                red_ticks: stats.red_ticks,
                green_ticks: stats.green_ticks,
                blue_ticks: stats.blue_ticks,
                rows_recorded: stats.rows_recorded,
                last_run_id: stats.run_id,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.ticks.store(persisted.ticks, Ordering::Relaxed);
                self.outlier_ticks
                    .store(persisted.outlier_ticks, Ordering::Relaxed);
                self.red_ticks.store(persisted.red_ticks, Ordering::Relaxed);
                self.green_ticks
                    .store(persisted.green_ticks, Ordering::Relaxed);
                self.blue_ticks.store(persisted.blue_ticks, Ordering::Relaxed);
                self.rows_recorded
                    .store(persisted.rows_recorded, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.ticks,
            &self.outlier_ticks,
            &self.red_ticks,
            &self.green_ticks,
            &self.blue_ticks,
            &self.rows_recorded,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the run counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub run_id: Uuid,
    pub ticks: u64,
    pub outlier_ticks: u64,
    pub red_ticks: u64,
    pub green_ticks: u64,
    pub blue_ticks: u64,
    pub rows_recorded: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    ticks: u64,
    outlier_ticks: u64,
    red_ticks: u64,
    green_ticks: u64,
    blue_ticks: u64,
    rows_recorded: u64,
    last_run_id: Uuid,
    last_updated: DateTime<Utc>,
}

/// Shared run log handle.
pub type SharedRunLog = Arc<RunLog>;

pub fn create_shared_log() -> SharedRunLog {
    Arc::new(RunLog::new())
}

pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedRunLog {
    Arc::new(RunLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassLabel, OutlierFlag};

    fn outlier() -> ClassificationResult {
        ClassificationResult::new(OutlierFlag::Outlier, ClassLabel::Class0)
    }

    fn normal() -> ClassificationResult {
        ClassificationResult::new(OutlierFlag::Inlier, ClassLabel::Class1)
    }

    #[test]
    fn test_tick_counting() {
        let log = RunLog::new();
        log.record_tick(&outlier(), SignalState::Green);
        log.record_tick(&outlier(), SignalState::Red);
        log.record_tick(&normal(), SignalState::Blue);

        let stats = log.stats();
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.outlier_ticks, 2);
        assert_eq!(stats.red_ticks, 1);
        assert_eq!(stats.green_ticks, 1);
        assert_eq!(stats.blue_ticks, 1);
    }

    #[test]
    fn test_reset() {
        let log = RunLog::new();
        log.record_rows(100);
        log.record_tick(&normal(), SignalState::Blue);
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.rows_recorded, 0);
        assert_eq!(stats.ticks, 0);
    }

    #[test]
    fn test_persistence_accumulates_across_runs() {
        let path = std::env::temp_dir()
            .join(format!("anomaly-indicator-stats-{}.json", Uuid::new_v4()));

        let first = RunLog::with_persistence(path.clone());
        first.record_rows(100);
        first.record_tick(&normal(), SignalState::Blue);
        first.save().unwrap();

        let second = RunLog::with_persistence(path.clone());
        second.record_rows(50);
        let stats = second.stats();
        assert_eq!(stats.rows_recorded, 150);
        assert_eq!(stats.blue_ticks, 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_summary_format() {
        let summary = RunLog::new().summary();
        assert!(summary.contains("Ticks classified"));
        assert!(summary.contains("RED / GREEN / BLUE"));
    }
}
