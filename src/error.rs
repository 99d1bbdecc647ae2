//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore della conversione batch.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` per categorizzare gli errori di batch e di task
//! - Distingue il rifiuto dell'intero batch dai fallimenti dei singoli file
//! - Integra con `thiserror` per conversione automatica degli errori I/O
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O durante lo staging dei file
//! - `InputRejected`: Batch vuoto o limite di concorrenza non valido
//! - `ToolUnavailable`: Il tool esterno non può essere avviato
//! - `ConversionFailed`: Il tool è partito ma non ha prodotto output valido
//! - `Timeout`: Il tool ha superato il tempo massimo per file
//! - `Worker`: Un worker è terminato in modo anomalo
//!
//! ## Esempio:
//! ```ignore
//! if sources.is_empty() {
//!     return Err(ConvertError::InputRejected("no input files".to_string()));
//! }
//! ```

use std::time::Duration;

use crate::report::FailureKind;

/// Errors raised by the converter and the batch coordinator
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Batch rejected: {0}")]
    InputRejected(String),

    #[error("Encoder unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Conversion timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Worker failure: {0}")]
    Worker(String),
}

impl ConvertError {
    /// Classify a task-level error for the batch report
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::ToolUnavailable(_) => FailureKind::ToolUnavailable,
            Self::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::ConversionFailed,
        }
    }

    /// Diagnostic text stored in a failed `ConversionResult`.
    ///
    /// For `ConversionFailed` this is the tool's own output, untouched.
    pub fn detail(&self) -> String {
        match self {
            Self::ConversionFailed(detail) | Self::ToolUnavailable(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}
