//! # Conversion Task Module
//!
//! Worker per la conversione di un singolo file del batch.
//!
//! ## Responsabilità:
//! - `NamedInput`: input fornito dal chiamante (bytes in memoria o path)
//! - `ConversionTask`: unità di lavoro con indice di sequenza nel batch
//! - `TaskRunner`: staging dell'input in una directory privata del task,
//!   invocazione del `Converter`, consegna dell'output e pulizia
//!
//! ## Ciclo di vita dei file temporanei:
//! 1. Crea `task-NNNN-*` sotto la work directory (guard `TempDir`)
//! 2. Scrive/copia l'input nella directory (guard `NamedTempFile`)
//! 3. Converte; l'input viene eliminato appena il converter ritorna
//! 4. Sposta l'output nella directory di consegna (se configurata) oppure
//!    lo legge in memoria; la directory del task viene eliminata all'uscita
//!
//! Le guard vengono rilasciate su ogni percorso di uscita, compresa la
//! cancellazione (drop del future).

use crate::{
    batch::naming::OutputNaming,
    converter::Converter,
    error::ConvertError,
    file_manager::FileManager,
    report::{ConversionResult, OutputArtifact},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Content of an input handed to the batch
#[derive(Debug, Clone)]
pub enum InputContent {
    Bytes(Vec<u8>),
    /// Copied into the task's staging directory before conversion
    Path(PathBuf),
}

/// One source submitted by the caller
#[derive(Debug, Clone)]
pub struct NamedInput {
    pub name: String,
    pub content: InputContent,
}

impl NamedInput {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: InputContent::Bytes(bytes),
        }
    }

    /// Named after the file name of `path`
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            content: InputContent::Path(path),
        }
    }
}

/// Unit of work: one source plus its position in the batch
#[derive(Debug)]
pub struct ConversionTask {
    pub source_name: String,
    pub content: InputContent,
    pub sequence_index: usize,
}

impl ConversionTask {
    pub fn new(sequence_index: usize, input: NamedInput) -> Self {
        Self {
            source_name: input.name,
            content: input.content,
            sequence_index,
        }
    }
}

/// Executes tasks with private staging directories
pub(crate) struct TaskRunner {
    converter: Arc<Converter>,
    staging_root: PathBuf,
    output_extension: String,
    /// None = outputs are returned in memory
    delivery_dir: Option<PathBuf>,
}

impl TaskRunner {
    pub fn new(converter: Arc<Converter>, staging_root: PathBuf, output_extension: String) -> Self {
        Self {
            converter,
            staging_root,
            output_extension,
            delivery_dir: None,
        }
    }

    pub fn delivering_to(mut self, delivery_dir: Option<PathBuf>) -> Self {
        self.delivery_dir = delivery_dir;
        self
    }

    /// Run one task to completion; errors become a failed result
    pub async fn run(&self, task: ConversionTask) -> ConversionResult {
        let start = Instant::now();
        let output_name =
            OutputNaming::output_name(&task.source_name, task.sequence_index, &self.output_extension);

        match self.execute(&task, &output_name).await {
            Ok(artifact) => {
                debug!("✅ {} -> {} ({} bytes)", task.source_name, output_name, artifact.size());
                ConversionResult::succeeded(
                    task.source_name,
                    task.sequence_index,
                    output_name,
                    artifact,
                    start.elapsed(),
                )
            }
            Err(e) => {
                warn!("❌ Conversion failed for {}: {}", task.source_name, e);
                ConversionResult::failed(
                    task.source_name,
                    task.sequence_index,
                    e.failure_kind(),
                    e.detail(),
                    start.elapsed(),
                )
            }
        }
    }

    async fn execute(&self, task: &ConversionTask, output_name: &str) -> Result<OutputArtifact, ConvertError> {
        let staging_dir = tempfile::Builder::new()
            .prefix(&format!("task-{:04}-", task.sequence_index))
            .tempdir_in(&self.staging_root)?;

        let suffix = OutputNaming::source_extension(&task.source_name)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let staged_input = tempfile::Builder::new()
            .prefix("input")
            .suffix(&suffix)
            .tempfile_in(staging_dir.path())?;
        Self::stage(&task.content, staged_input.path()).await?;

        let output_path = staging_dir.path().join(output_name);
        let conversion = self.converter.convert(staged_input.path(), &output_path).await;

        if let Err(e) = staged_input.close() {
            warn!("Failed to remove staged input for {}: {}", task.source_name, e);
        }
        conversion?;

        let artifact = match self.delivery_dir {
            Some(ref dir) => {
                let size = tokio::fs::metadata(&output_path).await?.len();
                let path = FileManager::deliver_output(dir, output_name, &output_path).await?;
                OutputArtifact::Saved { path, size }
            }
            None => OutputArtifact::Bytes(tokio::fs::read(&output_path).await?),
        };
        Ok(artifact)
    }

    async fn stage(content: &InputContent, target: &Path) -> Result<(), ConvertError> {
        match content {
            InputContent::Bytes(bytes) => tokio::fs::write(target, bytes).await?,
            InputContent::Path(source) => {
                tokio::fs::copy(source, target).await.map_err(|e| {
                    ConvertError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to stage {}: {}", source.display(), e),
                    ))
                })?;
            }
        }
        Ok(())
    }
}
