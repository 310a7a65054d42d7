/*!
 * Batch types for the dispatch engine.
 *
 * A batch is a contiguous slice of a document's segments carrying enough
 * identity (position + original indices) to correlate results back, whatever
 * order batches complete in.
 */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::BatchError;
use crate::subtitle::model::{Segment, SubtitleDocument, Word};

/// Contiguous group of segments processed together in one collaborator call
#[derive(Debug, Clone)]
pub struct Batch {
    /// 0-based position in the partition order
    pub position: usize,

    /// Owned copies of the segments in this batch, in document order
    pub segments: Vec<Segment>,
}

impl Batch {
    /// Original document indices covered by this batch
    pub fn indices(&self) -> Vec<usize> {
        self.segments.iter().map(|s| s.index).collect()
    }

    /// First and last document index in the batch
    pub fn index_range(&self) -> (usize, usize) {
        let first = self.segments.first().map(|s| s.index).unwrap_or(0);
        let last = self.segments.last().map(|s| s.index).unwrap_or(0);
        (first, last)
    }

    /// Wall-clock span of the batch, first start to last end
    pub fn span(&self) -> (f64, f64) {
        let start = self.segments.first().map(|s| s.start).unwrap_or(0.0);
        let end = self.segments.last().map(|s| s.end).unwrap_or(0.0);
        (start, end)
    }

    /// Batch duration in seconds
    pub fn duration(&self) -> f64 {
        let (start, end) = self.span();
        end - start
    }

    /// Timed words across the batch, one pseudo-word per segment when
    /// word-level detail is missing
    pub fn words(&self) -> Vec<Word> {
        let mut out = Vec::new();
        for segment in &self.segments {
            match &segment.words {
                Some(words) if !words.is_empty() => out.extend(words.iter().cloned()),
                _ => out.push(Word {
                    start: segment.start,
                    end: segment.end,
                    text: segment.text.clone(),
                }),
            }
        }
        out
    }
}

/// What a transform produced for one batch
#[derive(Debug, Clone)]
pub enum BatchPayload {
    /// One rewritten text per submitted segment index
    Texts(BTreeMap<usize, String>),

    /// Replacement segments for the whole batch slice (re-segmentation)
    Segments(Vec<Segment>),
}

/// Final status of one batch after retries and reflect resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Transform applied; with reflect on, the refined result landed
    Applied,

    /// Reflect phase failed for this batch; the phase-1 draft was kept
    DraftKept,

    /// Retry budget exhausted; the batch keeps its original text
    Failed,

    /// Cancelled before this batch started; original text kept
    Skipped,
}

/// Advisory per-batch report delivered to the progress observer in
/// completion order. Never affects final assembly.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// 0-based batch position in the partition order
    pub position: usize,

    /// First document index in the batch
    pub first_index: usize,

    /// Last document index in the batch
    pub last_index: usize,

    /// How the batch resolved
    pub status: BatchStatus,

    /// Failure detail, present for failed batches
    pub error: Option<String>,
}

/// Cooperative cancellation handle shared between the caller and a dispatch
/// run. Checked before submitting a batch or a retry; in-flight collaborator
/// calls are left to finish naturally.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a fresh, uncancelled flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Partition a document into ceil(N/B) contiguous batches preserving order
/// and original indices
pub fn partition(doc: &SubtitleDocument, batch_size: usize) -> Vec<Batch> {
    doc.segments
        .chunks(batch_size)
        .enumerate()
        .map(|(position, chunk)| Batch {
            position,
            segments: chunk.to_vec(),
        })
        .collect()
}

/// Structural validation of a transform's payload against the batch it was
/// produced for. Any mismatch is a retry-eligible validation failure.
pub(crate) fn validate_payload(
    batch: &Batch,
    payload: &BatchPayload,
    duration_epsilon: f64,
) -> Result<(), BatchError> {
    match payload {
        BatchPayload::Texts(map) => {
            let expected = batch.indices();
            if map.len() != expected.len() {
                return Err(BatchError::Validation(format!(
                    "expected {} entries, got {}",
                    expected.len(),
                    map.len()
                )));
            }
            for index in &expected {
                if !map.contains_key(index) {
                    return Err(BatchError::Validation(format!(
                        "missing result for segment {}",
                        index
                    )));
                }
            }
            Ok(())
        }
        BatchPayload::Segments(segments) => {
            if segments.is_empty() {
                return Err(BatchError::Validation("empty replacement segment list".into()));
            }
            for segment in segments {
                if segment.start >= segment.end {
                    return Err(BatchError::Validation(format!(
                        "replacement segment has start {} >= end {}",
                        segment.start, segment.end
                    )));
                }
            }
            for pair in segments.windows(2) {
                if pair[1].start < pair[0].start {
                    return Err(BatchError::Validation(
                        "replacement segments out of chronological order".into(),
                    ));
                }
            }
            let produced = segments.last().map(|s| s.end).unwrap_or(0.0)
                - segments.first().map(|s| s.start).unwrap_or(0.0);
            if (produced - batch.duration()).abs() > duration_epsilon {
                return Err(BatchError::Validation(format!(
                    "replacement duration {:.3}s differs from batch duration {:.3}s beyond epsilon {:.3}s",
                    produced,
                    batch.duration(),
                    duration_epsilon
                )));
            }
            Ok(())
        }
    }
}
