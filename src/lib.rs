//! # AVI Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione esplicita del batch e profilo di encoding
//! - `error`: Tipi di errore di batch e di task
//! - `converter`: Singola invocazione dell'encoder esterno
//! - `batch`: Coordinator con worker pool limitato
//! - `report`: Risultati per file e report aggregato
//! - `file_manager`: Discovery input e salvataggio output (CLI)
//! - `platform`: Risoluzione cross-platform dell'encoder
//! - `progress`: Progress bar
//! - `json_output`: Eventi JSON per chiamanti programmatici
//!
//! ## Utilizzo:
//! ```ignore
//! use avi_converter::{BatchCoordinator, Config, NamedInput};
//! use tokio_util::sync::CancellationToken;
//!
//! let coordinator = BatchCoordinator::new(Config::default());
//! let inputs = vec![NamedInput::from_bytes("clip.avi", bytes)];
//! let report = coordinator.run(inputs, CancellationToken::new()).await?;
//! ```

pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod platform;
pub mod progress;
pub mod report;

#[cfg(all(test, unix))]
mod test_support;

pub use batch::{BatchCoordinator, BatchProgress, NamedInput};
pub use config::{Config, EncodingProfile};
pub use converter::Converter;
pub use error::ConvertError;
pub use report::{BatchReport, ConversionResult, FailureKind, OutputArtifact, TaskOutcome};
