//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per i chiamanti
//! programmatici (es. un front-end web che mostra il batch).
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del batch
//! - `file_complete`: Fine elaborazione di un file (successo o errore)
//! - `progress`: Avanzamento `(completed, total)`
//! - `complete`: Fine del batch con conteggi finali
//! - `error`: Errore che impedisce l'esecuzione del batch

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::batch::BatchProgress;
use crate::report::{BatchReport, ConversionResult};

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        total_files: usize,
        workers: usize,
        output_dir: PathBuf,
    },

    #[serde(rename = "file_complete")]
    FileComplete {
        source_name: String,
        sequence_index: usize,
        status: String,
        output_name: Option<String>,
        output_path: Option<PathBuf>,
        error: Option<String>,
        duration_seconds: f64,
    },

    #[serde(rename = "progress")]
    Progress {
        completed: usize,
        total: usize,
        percentage: f64,
    },

    #[serde(rename = "complete")]
    Complete {
        succeeded: usize,
        failed: usize,
        not_run: usize,
        cancelled: bool,
        duration_seconds: f64,
    },

    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(total_files: usize, workers: usize, output_dir: PathBuf) -> Self {
        Self::Start {
            total_files,
            workers,
            output_dir,
        }
    }

    pub fn file_complete(result: &ConversionResult) -> Self {
        Self::FileComplete {
            source_name: result.source_name.clone(),
            sequence_index: result.sequence_index,
            status: result.status_label().to_string(),
            output_name: result.output_name().map(str::to_string),
            output_path: result.saved_path().map(|p| p.to_path_buf()),
            error: result.error_detail().map(str::to_string),
            duration_seconds: result.duration.as_secs_f64(),
        }
    }

    pub fn progress(progress: BatchProgress) -> Self {
        Self::Progress {
            completed: progress.completed,
            total: progress.total,
            percentage: progress.percentage(),
        }
    }

    pub fn complete(report: &BatchReport) -> Self {
        Self::Complete {
            succeeded: report.succeeded_count(),
            failed: report.failed_count(),
            not_run: report.not_run_count(),
            cancelled: report.cancelled,
            duration_seconds: report.elapsed.as_secs_f64(),
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FailureKind, OutputArtifact};
    use std::time::Duration;

    #[test]
    fn test_file_complete_message() {
        let result = ConversionResult::failed(
            "c.avi".into(),
            2,
            FailureKind::ConversionFailed,
            "invalid data".into(),
            Duration::from_millis(500),
        );
        let json = serde_json::to_value(JsonMessage::file_complete(&result)).unwrap();

        assert_eq!(json["type"], "file_complete");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "invalid data");
        assert!(json["output_name"].is_null());
        assert!(json["output_path"].is_null());
        assert_eq!(json["duration_seconds"], 0.5);
    }

    #[test]
    fn test_file_complete_reports_saved_path() {
        let result = ConversionResult::succeeded(
            "a.avi".into(),
            0,
            "a-0.mp4".into(),
            OutputArtifact::Saved {
                path: PathBuf::from("converted_videos/a-0.mp4"),
                size: 10,
            },
            Duration::from_secs(1),
        );
        let json = serde_json::to_value(JsonMessage::file_complete(&result)).unwrap();

        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["output_name"], "a-0.mp4");
        assert_eq!(json["output_path"], "converted_videos/a-0.mp4");
    }

    #[test]
    fn test_progress_message() {
        let json =
            serde_json::to_value(JsonMessage::progress(BatchProgress { completed: 1, total: 2 })).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percentage"], 50.0);
    }

    #[test]
    fn test_complete_message() {
        let report = BatchReport {
            results: vec![ConversionResult::not_run("a.avi".into(), 0)],
            total_submitted: 1,
            elapsed: Duration::from_secs(1),
            cancelled: true,
        };
        let json = serde_json::to_value(JsonMessage::complete(&report)).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["not_run"], 1);
        assert_eq!(json["cancelled"], true);
    }
}
