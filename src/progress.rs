//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce le notifiche di avanzamento e il riepilogo finale.
//!
//! ## Responsabilità:
//! - Trait `ProgressReporter`: collaboratore esterno per le notifiche
//!   (handle iniziale, aggiornamenti incrementali, stato finale, notifiche brevi)
//! - `ConsoleReporter`: progress bar con `indicatif` + log con `tracing`
//! - `BatchSummary`: statistiche aggregate calcolate una volta per batch
//! - `BatchOutcome`: classificazione tutti ok / tutti falliti / misto
//!
//! ## Statistiche:
//! - **succeeded** / **failed**: conteggio esiti
//! - **total_original_size** / **total_compressed_size**: somma dei file riusciti
//! - **percent_saved**: `None` se la dimensione originale totale è zero ("N/A")
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 3/5 (60%) [4/5] robot.glb
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::file_manager::FileManager;
use crate::optimizer::CompressionResult;

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Success,
    Failure,
    Info,
}

/// Receives progress notifications from the batch orchestrator.
///
/// Calls arrive from a single control thread, between command invocations.
pub trait ProgressReporter {
    /// Initial progress handle for a batch of `total` files
    fn start(&mut self, title: &str, total: usize);

    /// A file is about to be processed (`index` is 1-based)
    fn update(&mut self, index: usize, total: usize, file_name: &str);

    /// A file finished, successfully or not
    fn file_finished(&mut self, _result: &CompressionResult) {}

    /// Exactly one terminal status per batch
    fn finish(&mut self, status: NotificationStatus, title: &str, message: &str);

    /// Fire-and-forget notification for early exits
    fn notify(&mut self, status: NotificationStatus, message: &str);
}

/// Progress bar on stderr plus log lines
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

impl ProgressReporter for ConsoleReporter {
    fn start(&mut self, title: &str, total: usize) {
        info!("{}", title);

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn update(&mut self, index: usize, total: usize, file_name: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(format!("[{}/{}] {}", index, total, file_name));
        }
    }

    fn file_finished(&mut self, result: &CompressionResult) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
        if let Some(ref err) = result.error {
            warn!("{}: {}", result.file, err);
        }
    }

    fn finish(&mut self, status: NotificationStatus, title: &str, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(title.to_string());
        }
        match status {
            NotificationStatus::Failure => error!("{} | {}", title, message),
            _ => info!("{} | {}", title, message),
        }
    }

    fn notify(&mut self, status: NotificationStatus, message: &str) {
        match status {
            NotificationStatus::Failure => error!("{}", message),
            _ => info!("{}", message),
        }
    }
}

/// How a batch turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    AllSucceeded,
    AllFailed,
    Mixed,
}

/// Aggregate statistics derived from the per-file results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_original_size: u64,
    pub total_compressed_size: u64,
    pub first_error: Option<String>,
}

impl BatchSummary {
    pub fn from_results(results: &[CompressionResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            if result.success {
                summary.succeeded += 1;
                summary.total_original_size += result.original_size.unwrap_or(0);
                summary.total_compressed_size += result.compressed_size.unwrap_or(0);
            } else {
                summary.failed += 1;
                if summary.first_error.is_none() {
                    summary.first_error = result.error.clone();
                }
            }
        }
        summary
    }

    pub fn outcome(&self) -> BatchOutcome {
        if self.failed == 0 {
            BatchOutcome::AllSucceeded
        } else if self.succeeded == 0 {
            BatchOutcome::AllFailed
        } else {
            BatchOutcome::Mixed
        }
    }

    /// Bytes saved; negative when the outputs grew
    pub fn bytes_saved(&self) -> i128 {
        self.total_original_size as i128 - self.total_compressed_size as i128
    }

    pub fn percent_saved(&self) -> Option<f64> {
        FileManager::calculate_reduction(self.total_original_size, self.total_compressed_size)
    }

    pub fn percent_text(&self) -> String {
        self.percent_saved()
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn savings_text(&self) -> String {
        let saved = self.bytes_saved();
        let amount = FileManager::format_bytes(saved.unsigned_abs().min(u64::MAX as u128) as u64);
        if saved >= 0 {
            format!("Saved {} ({})", amount, self.percent_text())
        } else {
            format!("Output grew by {} ({})", amount, self.percent_text())
        }
    }

    pub fn status(&self) -> NotificationStatus {
        match self.outcome() {
            BatchOutcome::AllSucceeded => NotificationStatus::Success,
            BatchOutcome::AllFailed | BatchOutcome::Mixed => NotificationStatus::Failure,
        }
    }

    /// Title of the terminal notification
    pub fn title(&self) -> String {
        match self.outcome() {
            BatchOutcome::AllSucceeded => format!("Optimized {} {}", self.total, files(self.total)),
            BatchOutcome::AllFailed => format!("Failed to optimize {} {}", self.total, files(self.total)),
            BatchOutcome::Mixed => format!(
                "Optimized {} of {} {}, {} failed",
                self.succeeded,
                self.total,
                files(self.total),
                self.failed
            ),
        }
    }

    /// Body of the terminal notification
    pub fn message(&self) -> String {
        let error = self.first_error.as_deref().unwrap_or("Unknown error");
        match self.outcome() {
            BatchOutcome::AllSucceeded => self.savings_text(),
            BatchOutcome::AllFailed => error.to_string(),
            BatchOutcome::Mixed => format!("{}. First error: {}", self.savings_text(), error),
        }
    }
}

fn files(count: usize) -> &'static str {
    if count == 1 {
        "file"
    } else {
        "files"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(file: &str, original: u64, compressed: u64) -> CompressionResult {
        CompressionResult::succeeded(file, original, compressed, None)
    }

    fn failed(file: &str, error: &str) -> CompressionResult {
        CompressionResult::failed(file, error.to_string(), Some(10))
    }

    #[test]
    fn test_percent_saved() {
        let summary = BatchSummary::from_results(&[ok("a.glb", 100, 50), ok("b.glb", 200, 100)]);
        assert_eq!(summary.total_original_size, 300);
        assert_eq!(summary.total_compressed_size, 150);
        assert_eq!(summary.percent_saved(), Some(50.0));
        assert_eq!(summary.message(), "Saved 150 Bytes (50.0%)");
    }

    #[test]
    fn test_zero_original_size_is_not_a_percentage() {
        let summary = BatchSummary::from_results(&[ok("empty.glb", 0, 0)]);
        assert_eq!(summary.percent_saved(), None);
        assert_eq!(summary.percent_text(), "N/A");
    }

    #[test]
    fn test_outcome_classification() {
        let all_ok = BatchSummary::from_results(&[ok("a.glb", 10, 5), ok("b.glb", 10, 5)]);
        assert_eq!(all_ok.outcome(), BatchOutcome::AllSucceeded);
        assert_eq!(all_ok.title(), "Optimized 2 files");

        let all_failed = BatchSummary::from_results(&[failed("a.glb", "boom"), failed("b.glb", "bang")]);
        assert_eq!(all_failed.outcome(), BatchOutcome::AllFailed);
        assert_eq!(all_failed.message(), "boom");

        let mixed = BatchSummary::from_results(&[ok("a.glb", 10, 5), failed("b.glb", "bang")]);
        assert_eq!(mixed.outcome(), BatchOutcome::Mixed);
        assert_eq!(mixed.title(), "Optimized 1 of 2 files, 1 failed");
        assert!(mixed.message().contains("bang"));
        assert_eq!(mixed.status(), NotificationStatus::Failure);
    }

    #[test]
    fn test_failed_sizes_are_not_aggregated() {
        let summary = BatchSummary::from_results(&[ok("a.glb", 100, 40), failed("b.glb", "x")]);
        assert_eq!(summary.total_original_size, 100);
        assert_eq!(summary.total_compressed_size, 40);
    }

    #[test]
    fn test_growth_is_reported() {
        let summary = BatchSummary::from_results(&[ok("a.glb", 1024, 2048)]);
        assert_eq!(summary.bytes_saved(), -1024);
        assert_eq!(summary.savings_text(), "Output grew by 1.00 KB (-100.0%)");
    }
}
