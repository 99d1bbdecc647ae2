//! # Batch Module
//!
//! Conversione batch con concorrenza limitata, separata in sottomoduli:
//! - `coordinator`: Orchestratore del batch e worker pool
//! - `task`: Input, task e staging dei file per singolo task
//! - `progress_tracker`: Accumulo risultati e notifica di avanzamento
//! - `naming`: Calcolo dei nomi di output univoci nel batch

pub mod coordinator;
pub mod naming;
pub mod progress_tracker;
pub mod task;

pub use coordinator::BatchCoordinator;
pub use naming::OutputNaming;
pub use progress_tracker::{BatchProgress, ProgressCallback};
pub use task::{ConversionTask, InputContent, NamedInput};
