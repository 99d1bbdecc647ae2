//! # Progress Tracking Module
//!
//! Accumulatore thread-safe dei risultati del batch.
//! È l'unica risorsa mutabile condivisa tra i worker: ogni risultato viene
//! registrato sotto mutex e la callback di avanzamento riceve il conteggio
//! aggiornato, sempre crescente.
//!
//! Un panic nella callback viene intercettato e loggato: il risultato resta
//! registrato e il worker continua con il task successivo.

use crate::report::ConversionResult;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

/// Snapshot passed to the progress callback after each finished task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.completed as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Completion callback, invoked once per finished task
pub type ProgressCallback = Arc<dyn Fn(BatchProgress, &ConversionResult) + Send + Sync>;

/// Shared result accumulator
#[derive(Clone)]
pub(crate) struct ProgressTracker {
    total: usize,
    results: Arc<Mutex<Vec<ConversionResult>>>,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    pub fn new(total: usize, callback: Option<ProgressCallback>) -> Self {
        Self {
            total,
            results: Arc::new(Mutex::new(Vec::with_capacity(total))),
            callback,
        }
    }

    /// Record a finished task and notify the caller
    pub async fn record(&self, result: ConversionResult) {
        let mut results = self.results.lock().await;
        let progress = BatchProgress {
            completed: results.len() + 1,
            total: self.total,
        };
        if let Some(ref callback) = self.callback {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(progress, &result))).is_err() {
                error!("Progress callback panicked on {}", result.source_name);
            }
        }
        results.push(result);
    }

    /// Results recorded so far, in completion order
    pub async fn take_results(&self) -> Vec<ConversionResult> {
        std::mem::take(&mut *self.results.lock().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[test]
    fn test_percentage() {
        assert_eq!(BatchProgress { completed: 1, total: 4 }.percentage(), 25.0);
        assert_eq!(BatchProgress { completed: 0, total: 0 }.percentage(), 0.0);
    }

    #[tokio::test]
    async fn test_record_notifies_in_order() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback: ProgressCallback = Arc::new(move |progress: BatchProgress, result: &ConversionResult| {
            seen_clone
                .lock()
                .unwrap()
                .push((progress.completed, progress.total, result.source_name.clone()));
        });

        let tracker = ProgressTracker::new(2, Some(callback));
        tracker.record(ConversionResult::not_run("b.avi".into(), 1)).await;
        tracker
            .record(ConversionResult::succeeded(
                "a.avi".into(),
                0,
                "a-0.mp4".into(),
                vec![1],
                Duration::ZERO,
            ))
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(1, 2, "b.avi".to_string()), (2, 2, "a.avi".to_string())]
        );

        let results = tracker.take_results().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source_name, "b.avi");
    }

    #[tokio::test]
    async fn test_panicking_callback_keeps_results() {
        let callback: ProgressCallback = Arc::new(|_: BatchProgress, _: &ConversionResult| {
            panic!("renderer crashed");
        });

        let tracker = ProgressTracker::new(2, Some(callback));
        tracker.record(ConversionResult::not_run("a.avi".into(), 0)).await;
        tracker.record(ConversionResult::not_run("b.avi".into(), 1)).await;

        let results = tracker.take_results().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].source_name, "b.avi");
    }
}
