//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del batch.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking delle statistiche cumulative (replaced, reverted, errors)
//! - Report finale con byte risparmiati e percentuale complessiva
//!
//! ## Statistiche tracciate:
//! - **files_processed**: Totale file elaborati
//! - **files_replaced**: File sostituiti dal risultato encoder
//! - **files_reverted**: File lasciati intatti (risparmio sotto soglia)
//! - **errors**: Numero di errori durante il processing
//!
//! Il risparmio totale è con segno: tenere un risultato più grande
//! dell'originale (soglia a zero) lo porta sotto zero.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) photo.jpg -12.4%
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a batch run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Set a custom message without incrementing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();

        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );

        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        spinner
    }
}

/// Statistics tracker for batch results
#[derive(Debug, Default)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_replaced: usize,
    pub files_reverted: usize,
    pub errors: usize,
    pub total_original_size: u64,
    pub total_final_size: u64,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_replaced(&mut self, original_size: u64, final_size: u64) {
        self.files_processed += 1;
        self.files_replaced += 1;
        self.total_original_size += original_size;
        self.total_final_size += final_size;
    }

    pub fn add_reverted(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_reverted += 1;
        self.total_original_size += original_size;
        self.total_final_size += original_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    /// Net bytes saved across the batch, negative when results grew
    pub fn bytes_saved(&self) -> i64 {
        self.total_original_size as i64 - self.total_final_size as i64
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.bytes_saved() as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Net savings rendered as a size string, with a leading `-` when negative
    pub fn format_bytes_saved(&self) -> String {
        let saved = self.bytes_saved();
        if saved < 0 {
            format!(
                "-{}",
                crate::file_manager::FileManager::format_size(saved.unsigned_abs())
            )
        } else {
            crate::file_manager::FileManager::format_size(saved as u64)
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Replaced: {} | Reverted: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_replaced,
            self.files_reverted,
            self.errors,
            self.format_bytes_saved(),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accounting() {
        let mut stats = OptimizationStats::new();
        stats.add_replaced(1000, 600);
        stats.add_reverted(500);
        stats.add_error();

        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.files_replaced, 1);
        assert_eq!(stats.files_reverted, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.bytes_saved(), 400);
    }

    #[test]
    fn test_negative_savings_when_results_grew() {
        let mut stats = OptimizationStats::new();
        stats.add_replaced(1000, 1400);

        assert_eq!(stats.bytes_saved(), -400);
        assert!(stats.overall_reduction_percent() < 0.0);
        assert!(stats.format_summary().contains("Total saved: -400 B"));
    }

    #[test]
    fn test_empty_batch_reduction_is_zero() {
        let stats = OptimizationStats::new();
        assert_eq!(stats.overall_reduction_percent(), 0.0);
    }
}
