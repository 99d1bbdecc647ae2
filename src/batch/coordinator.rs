//! # Batch Coordinator
//!
//! Orchestratore principale della conversione batch.
//!
//! ## Responsabilità:
//! - Valida l'input del batch (`InputRejected` prima di avviare i worker)
//! - Crea un worker pool di dimensione `min(max_concurrency, numero file)`
//! - Ogni worker preleva il prossimo task dalla coda condivisa e lo converte
//! - Raccoglie i risultati in ordine di completamento
//! - Con `with_output_dir` ogni output viene spostato su disco appena il suo
//!   task termina, senza restare in memoria fino alla fine del batch
//! - Notifica l'avanzamento `(completati, totale)` dopo ogni task
//! - Gestisce la cancellazione: nessun nuovo task, processi in corso
//!   terminati, task rimanenti marcati come `NotRun`
//!
//! ## Gestione concorrenza:
//! - Ogni worker esegue una conversione alla volta: il numero di processi
//!   encoder attivi non supera mai la dimensione del pool
//! - Coda e accumulatore dei risultati sono protetti da `tokio::sync::Mutex`
//! - Ogni task ha la propria directory temporanea: nessun path condiviso
//!
//! ## Error handling:
//! - Un file che fallisce non interrompe il batch
//! - Se l'encoder non può essere avviato, i task non ancora iniziati vengono
//!   marcati come `ToolUnavailable` senza rilanciarlo (`abort_on_missing_tool`)
//!
//! ## Esempio:
//! ```ignore
//! let coordinator = BatchCoordinator::new(config)
//!     .with_progress(|progress, result| println!("{}/{} {}", progress.completed, progress.total, result.source_name));
//! let report = coordinator.run(inputs, CancellationToken::new()).await?;
//! ```

use crate::{
    batch::{
        progress_tracker::{BatchProgress, ProgressCallback, ProgressTracker},
        task::{ConversionTask, NamedInput, TaskRunner},
    },
    config::Config,
    converter::Converter,
    error::ConvertError,
    report::{BatchReport, ConversionResult, FailureKind},
};
use futures::future::join_all;
use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Runs batches of conversions under a bounded worker pool
pub struct BatchCoordinator {
    config: Config,
    converter: Arc<Converter>,
    on_progress: Option<ProgressCallback>,
    output_dir: Option<PathBuf>,
}

impl BatchCoordinator {
    pub fn new(config: Config) -> Self {
        let converter = Arc::new(Converter::new(&config));
        Self {
            config,
            converter,
            on_progress: None,
            output_dir: None,
        }
    }

    /// Deliver each output into `dir` as soon as its task finishes
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Register a callback fired once per finished task
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(BatchProgress, &ConversionResult) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Run a batch with `config.workers` as concurrency limit
    pub async fn run(
        &self,
        sources: Vec<NamedInput>,
        cancel: CancellationToken,
    ) -> Result<BatchReport, ConvertError> {
        self.run_batch(sources, self.config.workers, cancel).await
    }

    /// Convert every source with at most `max_concurrency` encoders running.
    ///
    /// Returns once every task has a result, or after `cancel` fires. In the
    /// latter case unfinished tasks are reported as not run.
    pub async fn run_batch(
        &self,
        sources: Vec<NamedInput>,
        max_concurrency: usize,
        cancel: CancellationToken,
    ) -> Result<BatchReport, ConvertError> {
        if sources.is_empty() {
            return Err(ConvertError::InputRejected("no input files submitted".to_string()));
        }
        if max_concurrency == 0 {
            return Err(ConvertError::InputRejected(
                "concurrency limit must be at least 1".to_string(),
            ));
        }

        let start_time = Instant::now();
        let total = sources.len();
        let worker_count = max_concurrency.min(total);
        info!(
            "Starting batch: {} file(s), {} worker(s), encoder {}",
            total,
            worker_count,
            self.converter.tool().display()
        );

        let queue: VecDeque<ConversionTask> = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| ConversionTask::new(index, source))
            .collect();

        let context = WorkerContext {
            queue: Arc::new(Mutex::new(queue)),
            tracker: ProgressTracker::new(total, self.on_progress.clone()),
            runner: Arc::new(
                TaskRunner::new(
                    self.converter.clone(),
                    self.config.staging_root(),
                    self.config.profile.output_extension.clone(),
                )
                .delivering_to(self.output_dir.clone()),
            ),
            cancel: cancel.clone(),
            tool_failure: Arc::new(Mutex::new(None)),
            abort_on_missing_tool: self.config.abort_on_missing_tool,
            not_run: Arc::new(Mutex::new(Vec::new())),
        };

        let workers: Vec<_> = (0..worker_count)
            .map(|worker_id| tokio::spawn(context.clone().run(worker_id)))
            .collect();

        for joined in join_all(workers).await {
            if let Err(e) = joined {
                error!("Worker terminated abnormally: {}", e);
                return Err(ConvertError::Worker(e.to_string()));
            }
        }

        // Tasks never dispatched because of cancellation
        let mut not_run = std::mem::take(&mut *context.not_run.lock().await);
        not_run.extend(
            context
                .queue
                .lock()
                .await
                .drain(..)
                .map(|task| ConversionResult::not_run(task.source_name, task.sequence_index)),
        );
        not_run.sort_by_key(|r| r.sequence_index);

        let mut results = context.tracker.take_results().await;
        let cancelled = !not_run.is_empty();
        results.extend(not_run);

        let report = BatchReport {
            results,
            total_submitted: total,
            elapsed: start_time.elapsed(),
            cancelled,
        };

        if cancelled {
            warn!("Batch cancelled: {}", report.format_summary());
        } else {
            info!("Batch complete: {}", report.format_summary());
        }

        Ok(report)
    }
}

/// State shared by the workers of one batch
#[derive(Clone)]
struct WorkerContext {
    queue: Arc<Mutex<VecDeque<ConversionTask>>>,
    tracker: ProgressTracker,
    runner: Arc<TaskRunner>,
    cancel: CancellationToken,
    tool_failure: Arc<Mutex<Option<String>>>,
    abort_on_missing_tool: bool,
    not_run: Arc<Mutex<Vec<ConversionResult>>>,
}

impl WorkerContext {
    async fn run(self, worker_id: usize) {
        debug!("Worker {} started", worker_id);

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(task) = self.queue.lock().await.pop_front() else {
                break;
            };

            if self.abort_on_missing_tool {
                let known_failure = self.tool_failure.lock().await.clone();
                if let Some(detail) = known_failure {
                    debug!("Worker {}: skipping {}, encoder unavailable", worker_id, task.source_name);
                    self.tracker
                        .record(ConversionResult::failed(
                            task.source_name,
                            task.sequence_index,
                            FailureKind::ToolUnavailable,
                            detail,
                            Duration::ZERO,
                        ))
                        .await;
                    continue;
                }
            }

            let source_name = task.source_name.clone();
            let sequence_index = task.sequence_index;
            debug!("Worker {} picked {} (#{})", worker_id, source_name, sequence_index);

            match unless_cancelled(&self.cancel, self.runner.run(task)).await {
                Some(result) => {
                    if result.failure_kind() == Some(FailureKind::ToolUnavailable) {
                        let mut tool_failure = self.tool_failure.lock().await;
                        if tool_failure.is_none() {
                            *tool_failure = result.error_detail().map(str::to_string);
                        }
                    }
                    self.tracker.record(result).await;
                }
                None => {
                    info!("Cancelled in-flight conversion of {}", source_name);
                    self.not_run
                        .lock()
                        .await
                        .push(ConversionResult::not_run(source_name, sequence_index));
                    break;
                }
            }
        }

        debug!("Worker {} finished", worker_id);
    }
}

/// Drive `work` until it completes or `cancel` fires.
///
/// Work that is already complete wins over a cancellation seen in the same poll.
async fn unless_cancelled<F: Future>(cancel: &CancellationToken, work: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        output = work => Some(output),
        _ = cancel.cancelled() => None,
    }
}
