use crate::executor::ExecutionReport;
use crate::model::{ClassificationRow, PlanKind, PlanSummary};

/// Items processed between two progress notifications.
pub const PROGRESS_INTERVAL: usize = 5;

/// Trait for reporting prepare/execute progress.
///
/// The CLI implements it with indicatif bars; tests record the calls.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_prepare_start(&self) {}
    fn on_scan_complete(&self, _preserve_files: usize, _cleanup_files: usize, _duration_secs: f64) {}
    /// Called at 0, at least every [`PROGRESS_INTERVAL`] items, and at `total`.
    fn on_progress(&self, _processed: usize, _total: usize, _status: &str) {}
    fn on_prepare_complete(&self, _summary: &PlanSummary, _duration_secs: f64) {}
    fn on_execute_start(&self, _kind: PlanKind, _total: usize) {}
    fn on_execute_complete(&self, _report: &ExecutionReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Receives classification rows as the engine produces them.
pub trait ResultSink {
    /// Drops every row from a previous `prepare`.
    fn clear(&mut self);
    fn push(&mut self, row: &ClassificationRow);
}

/// Discards rows; the plan still carries them.
pub struct NullSink;

impl ResultSink for NullSink {
    fn clear(&mut self) {}
    fn push(&mut self, _row: &ClassificationRow) {}
}

/// Throttles `on_progress` calls to the cadence reporters are promised.
pub(crate) struct ProgressTicker<'a> {
    reporter: &'a dyn ProgressReporter,
    total: usize,
}

impl<'a> ProgressTicker<'a> {
    pub(crate) fn new(reporter: &'a dyn ProgressReporter, total: usize, status: &str) -> Self {
        reporter.on_progress(0, total, status);
        Self { reporter, total }
    }

    pub(crate) fn tick(&self, processed: usize, status: impl FnOnce() -> String) {
        if processed % PROGRESS_INTERVAL == 0 || processed == self.total {
            self.reporter.on_progress(processed, self.total, &status());
        }
    }

    pub(crate) fn finish(&self, status: &str) {
        self.reporter.on_progress(self.total, self.total, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressReporter for Recorder {
        fn on_progress(&self, processed: usize, total: usize, _status: &str) {
            self.calls.lock().unwrap().push((processed, total));
        }
    }

    #[test]
    fn test_ticker_cadence() {
        let recorder = Recorder::default();
        let ticker = ProgressTicker::new(&recorder, 12, "start");
        for i in 1..=12 {
            ticker.tick(i, || format!("{}/12", i));
        }
        let calls = recorder.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(0, 12), (5, 12), (10, 12), (12, 12)]);
    }

    #[test]
    fn test_ticker_empty_total() {
        let recorder = Recorder::default();
        let ticker = ProgressTicker::new(&recorder, 0, "start");
        ticker.finish("done");
        let calls = recorder.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(0, 0), (0, 0)]);
    }
}
