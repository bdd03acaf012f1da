//! Feature-table recording for offline model training.
//!
//! A session runs the sampler and the extractor for a fixed number of
//! ticks and writes one CSV row per tick. Columns are named by position.

use crate::core::{column_names, FeatureExtractor, FeatureVector, SampleWindow};
use crate::hardware::{AnalogInput, HardwareError};
use crate::monitor::MonitorSettings;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Ordered rows of equally sized feature vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: usize,
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: FeatureVector) -> Result<(), RecorderError> {
        if row.len() != self.columns {
            return Err(RecorderError::ColumnMismatch {
                expected: self.columns,
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// Write header and rows as CSV.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), RecorderError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(column_names(self.columns))?;
        for row in &self.rows {
            csv.write_record(row.as_slice().iter().map(|v| v.to_string()))?;
        }
        csv.flush().map_err(|e| RecorderError::Io(e.to_string()))?;
        Ok(())
    }

    /// Write the table to `path`, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<(), RecorderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RecorderError::Io(e.to_string()))?;
        }
        let file = std::fs::File::create(path)
            .map_err(|e| RecorderError::Io(format!("{}: {e}", path.display())))?;
        self.write_to(file)
    }
}

/// Runs the sampler and extractor without classification.
pub struct SessionRecorder<A: AnalogInput> {
    adc: A,
    settings: MonitorSettings,
    window: SampleWindow,
    extractor: FeatureExtractor,
}

impl<A: AnalogInput> SessionRecorder<A> {
    pub fn new(adc: A, settings: MonitorSettings) -> Self {
        Self {
            adc,
            window: SampleWindow::new(settings.window_len, settings.baseline_sample),
            extractor: FeatureExtractor::new(settings.window_len),
            settings,
        }
    }

    /// Collect up to `count` rows.
    ///
    /// Stops early, keeping the rows gathered so far, when `running` is
    /// cleared.
    pub fn record(
        &mut self,
        count: usize,
        running: &AtomicBool,
    ) -> Result<FeatureTable, RecorderError> {
        let mut table = FeatureTable::new(self.extractor.feature_len());

        for tick in 0..count {
            if !running.load(Ordering::SeqCst) {
                tracing::warn!(recorded = tick, requested = count, "recording interrupted");
                break;
            }

            let sample = self.adc.read(self.settings.channel)?;
            self.window.push(f64::from(sample));
            table.push(self.extractor.extract(&self.window))?;
            tracing::debug!(tick = tick + 1, sample, "row recorded");

            if tick + 1 < count {
                thread::sleep(self.settings.tick_period);
            }
        }

        Ok(table)
    }
}

/// Recorder errors.
#[derive(Debug)]
pub enum RecorderError {
    Hardware(HardwareError),
    Io(String),
    Csv(String),
    ColumnMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for RecorderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderError::Hardware(e) => write!(f, "{e}"),
            RecorderError::Io(e) => write!(f, "IO error: {e}"),
            RecorderError::Csv(e) => write!(f, "CSV error: {e}"),
            RecorderError::ColumnMismatch { expected, actual } => {
                write!(f, "Row has {actual} columns, table has {expected}")
            }
        }
    }
}

impl std::error::Error for RecorderError {}

impl From<HardwareError> for RecorderError {
    fn from(e: HardwareError) -> Self {
        RecorderError::Hardware(e)
    }
}

impl From<csv::Error> for RecorderError {
    fn from(e: csv::Error) -> Self {
        RecorderError::Csv(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::ScriptedAdc;
    use std::sync::Arc;
    use std::time::Duration;

    /// Clears `running` on its `stop_after`-th read, like Ctrl+C mid-tick.
    struct InterruptingAdc {
        reads: usize,
        stop_after: usize,
        running: Arc<AtomicBool>,
    }

    impl AnalogInput for InterruptingAdc {
        fn read(&mut self, _channel: u8) -> Result<u8, HardwareError> {
            self.reads += 1;
            if self.reads == self.stop_after {
                self.running.store(false, Ordering::SeqCst);
            }
            Ok(177)
        }
    }

    fn settings() -> MonitorSettings {
        MonitorSettings {
            channel: 7,
            window_len: 10,
            baseline_sample: 177.0,
            tick_period: Duration::ZERO,
        }
    }

    #[test]
    fn test_record_collects_requested_rows() {
        let adc = ScriptedAdc::new(vec![170, 180, 190]);
        let mut recorder = SessionRecorder::new(adc, settings());
        let running = AtomicBool::new(true);
        let table = recorder.record(100, &running).unwrap();

        assert_eq!(table.len(), 100);
        assert_eq!(table.columns(), 12);
        assert!(table.rows().iter().all(|r| r.len() == 12));
    }

    #[test]
    fn test_interrupt_before_first_tick_yields_empty_table() {
        let mut recorder = SessionRecorder::new(ScriptedAdc::new(vec![177]), settings());
        let running = AtomicBool::new(false);
        let table = recorder.record(100, &running).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_interrupt_mid_session_keeps_partial_rows() {
        let running = Arc::new(AtomicBool::new(true));
        let adc = InterruptingAdc {
            reads: 0,
            stop_after: 7,
            running: Arc::clone(&running),
        };
        let mut recorder = SessionRecorder::new(adc, settings());
        let table = recorder.record(100, &running).unwrap();

        assert_eq!(table.len(), 7);
        assert!(table.rows().iter().all(|r| r.len() == 12));
    }

    #[test]
    fn test_csv_layout() {
        let mut recorder = SessionRecorder::new(ScriptedAdc::new(vec![177]), settings());
        let running = AtomicBool::new(true);
        let table = recorder.record(3, &running).unwrap();

        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0,1,2,3,4,5,6,7,8,9,10,11");
        assert_eq!(lines[1], "177,0,1770,0,0,0,0,0,0,0,0,0");
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), 12);
        }
    }

    #[test]
    fn test_row_width_checked() {
        let mut table = FeatureTable::new(4);
        let row = crate::core::extract_features(&SampleWindow::new(10, 1.0));
        assert!(matches!(
            table.push(row),
            Err(RecorderError::ColumnMismatch {
                expected: 4,
                actual: 12
            })
        ));
    }
}
