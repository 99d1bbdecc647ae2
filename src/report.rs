//! # Batch Report Module
//!
//! Questo modulo definisce i risultati della conversione di un batch.
//!
//! ## Responsabilità:
//! - `ConversionResult`: esito di un singolo task (successo, errore, non eseguito)
//! - `TaskOutcome`: garantisce a livello di tipo che un successo abbia un output
//!   e che un fallimento abbia un messaggio diagnostico
//! - `OutputArtifact`: output in memoria oppure già salvato su disco
//! - `BatchReport`: aggregato del batch con conteggi e tempo totale
//!
//! ## Ordinamento:
//! - I risultati completati sono in ordine di completamento, non di invio
//! - I task non eseguiti (batch cancellato) seguono, in ordine di invio
//!
//! ## Invariante:
//! `succeeded + failed + not_run == total_submitted`

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::file_manager::FileManager;

/// Why a task failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The encoder could not be launched
    ToolUnavailable,
    /// The encoder ran but exited non-zero or produced nothing
    ConversionFailed,
    /// The encoder exceeded the per-task timeout and was killed
    Timeout,
}

/// Artifact produced by a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputArtifact {
    /// Read back into memory before the staging directory was removed
    Bytes(Vec<u8>),
    /// Moved into the delivery directory when the task finished
    Saved { path: PathBuf, size: u64 },
}

impl OutputArtifact {
    pub fn size(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Saved { size, .. } => *size,
        }
    }
}

impl From<Vec<u8>> for OutputArtifact {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Outcome of one task
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Succeeded {
        output_name: String,
        artifact: OutputArtifact,
    },
    Failed {
        kind: FailureKind,
        detail: String,
    },
    /// Never finished because the batch was cancelled
    NotRun,
}

/// Result record for one submitted source
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub source_name: String,
    pub sequence_index: usize,
    pub outcome: TaskOutcome,
    pub duration: Duration,
}

impl ConversionResult {
    pub fn succeeded(
        source_name: String,
        sequence_index: usize,
        output_name: String,
        artifact: impl Into<OutputArtifact>,
        duration: Duration,
    ) -> Self {
        Self {
            source_name,
            sequence_index,
            outcome: TaskOutcome::Succeeded {
                output_name,
                artifact: artifact.into(),
            },
            duration,
        }
    }

    /// A failure always carries some diagnostic text, even if the tool printed nothing.
    pub fn failed(
        source_name: String,
        sequence_index: usize,
        kind: FailureKind,
        detail: String,
        duration: Duration,
    ) -> Self {
        let detail = if detail.trim().is_empty() {
            format!("{:?} without diagnostic output", kind)
        } else {
            detail
        };

        Self {
            source_name,
            sequence_index,
            outcome: TaskOutcome::Failed { kind, detail },
            duration,
        }
    }

    pub fn not_run(source_name: String, sequence_index: usize) -> Self {
        Self {
            source_name,
            sequence_index,
            outcome: TaskOutcome::NotRun,
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Failed { .. })
    }

    pub fn is_not_run(&self) -> bool {
        matches!(self.outcome, TaskOutcome::NotRun)
    }

    pub fn output_name(&self) -> Option<&str> {
        match &self.outcome {
            TaskOutcome::Succeeded { output_name, .. } => Some(output_name),
            _ => None,
        }
    }

    pub fn artifact(&self) -> Option<&OutputArtifact> {
        match &self.outcome {
            TaskOutcome::Succeeded { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Output content, when it was kept in memory
    pub fn output(&self) -> Option<&[u8]> {
        match self.artifact()? {
            OutputArtifact::Bytes(bytes) => Some(bytes),
            OutputArtifact::Saved { .. } => None,
        }
    }

    /// Where the output was delivered, when it went to disk
    pub fn saved_path(&self) -> Option<&Path> {
        match self.artifact()? {
            OutputArtifact::Saved { path, .. } => Some(path),
            OutputArtifact::Bytes(_) => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            TaskOutcome::Failed { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            TaskOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Short status label for logs and JSON events
    pub fn status_label(&self) -> &'static str {
        match self.outcome {
            TaskOutcome::Succeeded { .. } => "succeeded",
            TaskOutcome::Failed { .. } => "failed",
            TaskOutcome::NotRun => "not_run",
        }
    }
}

/// Aggregate over one submitted batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<ConversionResult>,
    pub total_submitted: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn not_run_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_not_run()).count()
    }

    pub fn successes(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// Total bytes produced by successful conversions
    pub fn total_output_bytes(&self) -> u64 {
        self.results
            .iter()
            .filter_map(|r| r.artifact())
            .map(OutputArtifact::size)
            .sum()
    }

    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "Converted: {} | Failed: {} | Total: {} | Output: {} | Time: {:.1}s",
            self.succeeded_count(),
            self.failed_count(),
            self.total_submitted,
            FileManager::format_size(self.total_output_bytes()),
            self.elapsed.as_secs_f64()
        );
        if self.cancelled {
            summary.push_str(&format!(" | Cancelled, not run: {}", self.not_run_count()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> BatchReport {
        BatchReport {
            results: vec![
                ConversionResult::succeeded(
                    "b.avi".into(),
                    1,
                    "b-1.mp4".into(),
                    vec![0u8; 2048],
                    Duration::from_millis(1200),
                ),
                ConversionResult::failed(
                    "c.avi".into(),
                    2,
                    FailureKind::ConversionFailed,
                    "invalid data".into(),
                    Duration::from_millis(300),
                ),
                ConversionResult::not_run("a.avi".into(), 0),
                ConversionResult::succeeded(
                    "d.avi".into(),
                    3,
                    "d-3.mp4".into(),
                    OutputArtifact::Saved {
                        path: PathBuf::from("converted_videos/d-3.mp4"),
                        size: 1024,
                    },
                    Duration::from_millis(800),
                ),
            ],
            total_submitted: 4,
            elapsed: Duration::from_secs(2),
            cancelled: true,
        }
    }

    #[test]
    fn test_counts_add_up() {
        let report = sample_report();
        assert_eq!(report.succeeded_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.not_run_count(), 1);
        assert_eq!(
            report.succeeded_count() + report.failed_count() + report.not_run_count(),
            report.total_submitted
        );
        assert_eq!(report.total_output_bytes(), 3072);
    }

    #[test]
    fn test_accessors_follow_outcome() {
        let report = sample_report();
        let ok = &report.results[0];
        assert_eq!(ok.output_name(), Some("b-1.mp4"));
        assert!(ok.error_detail().is_none());
        assert_eq!(ok.status_label(), "succeeded");
        assert_eq!(ok.output().map(<[u8]>::len), Some(2048));
        assert!(ok.saved_path().is_none());

        let saved = &report.results[3];
        assert!(saved.output().is_none());
        assert_eq!(saved.saved_path(), Some(Path::new("converted_videos/d-3.mp4")));

        let failed = &report.results[1];
        assert!(failed.output().is_none());
        assert_eq!(failed.error_detail(), Some("invalid data"));
        assert_eq!(failed.failure_kind(), Some(FailureKind::ConversionFailed));

        assert_eq!(report.results[2].status_label(), "not_run");
    }

    #[test]
    fn test_failure_without_output_gets_detail() {
        let result = ConversionResult::failed(
            "x.avi".into(),
            0,
            FailureKind::ConversionFailed,
            "  \n".into(),
            Duration::ZERO,
        );
        assert!(!result.error_detail().unwrap().trim().is_empty());
    }

    #[test]
    fn test_format_summary() {
        let summary = sample_report().format_summary();
        assert!(summary.contains("Converted: 2"));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("3.00 KB"));
        assert!(summary.contains("not run: 1"));
    }
}
