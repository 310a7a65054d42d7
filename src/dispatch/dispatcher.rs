/*!
 * Concurrent batch dispatch engine.
 *
 * Applies a caller-supplied transform to a document's segments in bounded
 * batches across a semaphore-limited worker pool. Output order derives
 * solely from the original partitioning, never from completion order, and
 * per-batch failures degrade to the original text instead of aborting the
 * run.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use tokio::sync::Semaphore;

use crate::dispatch::batch::{
    Batch, BatchPayload, BatchReport, BatchStatus, CancelFlag, partition, validate_payload,
};
use crate::errors::{BatchError, ConfigError};
use crate::subtitle::model::SubtitleDocument;

/// One stage's transform, applied batch by batch through an external
/// collaborator. Implementations must be safe to call concurrently.
#[async_trait]
pub trait BatchTransform: Send + Sync {
    /// Stage name for logs and progress reporting
    fn name(&self) -> &'static str;

    /// Produce a payload for one batch
    async fn run(&self, batch: &Batch) -> Result<BatchPayload, BatchError>;

    /// Refine a phase-1 draft (reflect mode phase 2). The default keeps the
    /// draft unchanged, so stages without a reflection variant are no-ops.
    async fn reflect(&self, batch: &Batch, draft: &BatchPayload) -> Result<BatchPayload, BatchError> {
        let _ = batch;
        Ok(draft.clone())
    }
}

/// Advisory per-batch progress callback, fired once per finalized batch in
/// completion order
pub type ProgressObserver = Arc<dyn Fn(&BatchReport) + Send + Sync>;

/// Dispatch engine configuration
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Worker pool size, at least 1
    pub workers: usize,

    /// Segments per batch, at least 1
    pub batch_size: usize,

    /// Retries per batch after the first failed attempt
    pub retry_limit: u32,

    /// Base backoff between retries, multiplied by the attempt number
    pub retry_backoff_ms: u64,

    /// Whether to run the two-phase reflect pass
    pub reflect: bool,

    /// Allowed drift between a batch's duration and a replacement payload's
    /// duration, in seconds
    pub duration_epsilon: f64,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            batch_size: 10,
            retry_limit: 2,
            retry_backoff_ms: 1000,
            reflect: false,
            duration_epsilon: 0.1,
        }
    }
}

impl DispatchOptions {
    /// Validate the configuration; fails before any work starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers < 1 {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }
        if self.batch_size < 1 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if !self.duration_epsilon.is_finite() || self.duration_epsilon < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "duration_epsilon",
                value: self.duration_epsilon.to_string(),
            });
        }
        Ok(())
    }
}

/// Result of one dispatch run: the reassembled document plus per-batch
/// reports in partition order
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Full-length output document, order and indices matching the input
    /// (split payloads may change the count; indices are renumbered)
    pub document: SubtitleDocument,

    /// Final report for every batch, sorted by batch position
    pub reports: Vec<BatchReport>,
}

/// How one batch resolved internally
struct Resolution {
    payload: Option<BatchPayload>,
    status: BatchStatus,
    error: Option<String>,
}

/// Concurrent batch dispatcher
pub struct BatchDispatcher {
    options: DispatchOptions,
}

impl BatchDispatcher {
    /// Create a dispatcher, validating the options up front
    pub fn new(options: DispatchOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Apply the transform to every segment of the document.
    ///
    /// The worker pool (a semaphore plus a buffered stream) is scoped to this
    /// call and fully drained on every exit path. A cancelled run still
    /// yields a well-formed partial document.
    pub async fn dispatch(
        &self,
        doc: &SubtitleDocument,
        transform: Arc<dyn BatchTransform>,
        cancel: &CancelFlag,
        observer: Option<ProgressObserver>,
    ) -> DispatchOutcome {
        if doc.is_empty() {
            return DispatchOutcome {
                document: doc.clone(),
                reports: Vec::new(),
            };
        }

        let batches = partition(doc, self.options.batch_size);
        let total = batches.len();
        debug!(
            "Dispatching {} segments as {} batches ({} workers, stage {})",
            doc.len(),
            total,
            self.options.workers,
            transform.name()
        );

        let semaphore = Arc::new(Semaphore::new(self.options.workers));

        let mut results = stream::iter(batches.iter().cloned())
            .map(|batch| {
                let transform = transform.clone();
                let semaphore = semaphore.clone();
                let cancel = cancel.clone();
                let observer = observer.clone();
                let options = self.options.clone();

                async move {
                    // Semaphore closes only on drop; acquire cannot fail here.
                    let _permit = semaphore.acquire().await.expect("dispatch semaphore closed");

                    let started = Instant::now();
                    let resolution = resolve_batch(&*transform, &batch, &options, &cancel).await;

                    let (first_index, last_index) = batch.index_range();
                    let report = BatchReport {
                        position: batch.position,
                        first_index,
                        last_index,
                        status: resolution.status,
                        error: resolution.error.clone(),
                    };

                    match resolution.status {
                        BatchStatus::Failed => warn!(
                            "Batch {}/{} ({}..{}) failed: {}",
                            batch.position + 1,
                            total,
                            first_index,
                            last_index,
                            resolution.error.as_deref().unwrap_or("unknown")
                        ),
                        _ => debug!(
                            "Batch {}/{} ({}..{}) resolved as {:?} in {:?}",
                            batch.position + 1,
                            total,
                            first_index,
                            last_index,
                            resolution.status,
                            started.elapsed()
                        ),
                    }

                    if let Some(observer) = &observer {
                        observer(&report);
                    }

                    (batch, resolution, report)
                }
            })
            .buffer_unordered(self.options.workers)
            .collect::<Vec<_>>()
            .await;

        // Final output order derives solely from the original partitioning.
        results.sort_by_key(|(batch, _, _)| batch.position);

        let mut segments = Vec::with_capacity(doc.len());
        let mut reports = Vec::with_capacity(total);

        for (batch, resolution, report) in results {
            match resolution.payload {
                Some(BatchPayload::Texts(map)) => {
                    for segment in &batch.segments {
                        // Validation guaranteed one entry per index.
                        let text = map.get(&segment.index).cloned().unwrap_or_else(|| segment.text.clone());
                        segments.push(segment.with_text(text));
                    }
                }
                Some(BatchPayload::Segments(replacement)) => {
                    segments.extend(replacement);
                }
                // Failed or skipped batches keep their original segments.
                None => segments.extend(batch.segments),
            }
            reports.push(report);
        }

        let mut document = SubtitleDocument { segments };
        document.renumber();

        DispatchOutcome { document, reports }
    }
}

/// Run one batch through retries and the optional reflect phase
async fn resolve_batch(
    transform: &dyn BatchTransform,
    batch: &Batch,
    options: &DispatchOptions,
    cancel: &CancelFlag,
) -> Resolution {
    if cancel.is_cancelled() {
        return Resolution {
            payload: None,
            status: BatchStatus::Skipped,
            error: None,
        };
    }

    // Phase 1: draft, with a bounded retry budget.
    let mut attempts = 0u32;
    let draft = loop {
        attempts += 1;
        let result = match transform.run(batch).await {
            Ok(payload) => validate_payload(batch, &payload, options.duration_epsilon).map(|()| payload),
            Err(e) => Err(e),
        };

        match result {
            Ok(payload) => break payload,
            Err(e) if e.is_retryable() && attempts <= options.retry_limit => {
                debug!(
                    "Batch {} attempt {} failed, retrying: {}",
                    batch.position + 1,
                    attempts,
                    e
                );
                tokio::time::sleep(Duration::from_millis(
                    options.retry_backoff_ms * attempts as u64,
                ))
                .await;
                if cancel.is_cancelled() {
                    return Resolution {
                        payload: None,
                        status: BatchStatus::Skipped,
                        error: Some(format!("cancelled during retry: {}", e)),
                    };
                }
            }
            Err(e) => {
                let permanent = BatchError::Permanent {
                    attempts,
                    last_error: e.to_string(),
                };
                return Resolution {
                    payload: None,
                    status: BatchStatus::Failed,
                    error: Some(permanent.to_string()),
                };
            }
        }
    };

    if !options.reflect || cancel.is_cancelled() {
        return Resolution {
            payload: Some(draft),
            status: BatchStatus::Applied,
            error: None,
        };
    }

    // Phase 2: refine the draft. A failure here falls back to the draft and
    // never fails the run.
    let refined = match transform.reflect(batch, &draft).await {
        Ok(payload) => validate_payload(batch, &payload, options.duration_epsilon).map(|()| payload),
        Err(e) => Err(e),
    };

    match refined {
        Ok(payload) => Resolution {
            payload: Some(payload),
            status: BatchStatus::Applied,
            error: None,
        },
        Err(e) => Resolution {
            payload: Some(draft),
            status: BatchStatus::DraftKept,
            error: Some(e.to_string()),
        },
    }
}
