//! # Progress Bar Module
//!
//! Progress bar visuale con `indicatif` per la CLI.
//!
//! L'avanzamento è binario per file (in attesa / completato): la barra
//! avanza di uno ad ogni notifica del coordinator, senza stimare il
//! progresso interno dell'encoder.
//!
//! ```text
//! ⠋ [00:02:15] [========================================>] 12/12 (100%) ✅ clip.avi
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::report::ConversionResult;

/// Manages progress reporting for a batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that draws nothing (JSON mode)
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    /// Advance by one finished file
    pub fn file_finished(&self, result: &ConversionResult) {
        let icon = if result.is_success() { "✅" } else { "❌" };
        self.bar.inc(1);
        self.bar.set_message(format!("{} {}", icon, result.source_name));
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_finished_advances() {
        let progress = ProgressManager::hidden();
        progress.file_finished(&ConversionResult::not_run("a.avi".into(), 0));
        progress.file_finished(&ConversionResult::not_run("b.avi".into(), 1));
        assert_eq!(progress.position(), 2);
        progress.finish("done");
    }
}
