use folder_reconcile_core::model::PlanSummary;
use folder_reconcile_core::{ExecutionReport, PlanKind, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (totals unknown until both trees are walked)
/// - Hash/classify phase: bar over preserve + cleanup files
/// - Execute phase: bar over the batch being applied
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn spinner(message: &'static str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn bar(total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliReporter {
    fn on_prepare_start(&self) {
        self.set_bar(Self::spinner("Scanning folders..."));
    }

    fn on_scan_complete(&self, preserve_files: usize, cleanup_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} preserve files, {} cleanup files in {:.2}s",
            preserve_files, cleanup_files, duration_secs
        );
        self.set_bar(Self::bar(preserve_files + cleanup_files));
    }

    fn on_progress(&self, processed: usize, total: usize, status: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                if pb.length() != Some(total as u64) {
                    pb.set_length(total as u64);
                }
                pb.set_position(processed as u64);
                pb.set_message(status.to_string());
            }
        }
    }

    fn on_prepare_complete(&self, summary: &PlanSummary, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Classification complete: {} pending operations in {:.2}s",
            summary.deletions + summary.rename_moves + summary.new_moves,
            duration_secs
        );
    }

    fn on_execute_start(&self, _kind: PlanKind, total: usize) {
        self.set_bar(Self::bar(total));
    }

    fn on_execute_complete(&self, report: &ExecutionReport) {
        self.finish_bar();
        let mark = if report.failed() == 0 {
            "\x1b[32m✓\x1b[0m"
        } else {
            "\x1b[31m✗\x1b[0m"
        };
        eprintln!(
            "  {} {}: {} of {} succeeded",
            mark, report.kind, report.succeeded, report.attempted
        );
    }
}
