/*!
 * Concurrent batch processing engine.
 *
 * - `batch`: batch identity, payloads, reports, partitioning, cancellation
 * - `dispatcher`: the worker-pool engine with retries, reflect mode, and
 *   ordered reassembly
 */

pub mod batch;
pub mod dispatcher;

pub use batch::{Batch, BatchPayload, BatchReport, BatchStatus, CancelFlag, partition};
pub use dispatcher::{
    BatchDispatcher, BatchTransform, DispatchOptions, DispatchOutcome, ProgressObserver,
};
