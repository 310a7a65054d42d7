/*!
 * # subpolish - LLM-assisted subtitle post-processing
 *
 * A Rust library for polishing machine-generated subtitles.
 *
 * ## Features
 *
 * - Group word-level ASR output into natural sentences
 * - Smooth display timing to reduce subtitle flicker
 * - Correct transcription errors, re-split, and translate subtitle text
 *   through LLM calls
 * - Ordered, retried, cancellable concurrent batch processing
 * - Two-phase "reflect" translation mode for higher quality
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle`: Data model, SRT I/O, and the pure passes:
 *   - `subtitle::model`: word/segment/document types
 *   - `subtitle::segmenter`: rule-based sentence grouping
 *   - `subtitle::timing`: flicker-reducing gap smoothing
 * - `dispatch`: the concurrent batch engine:
 *   - `dispatch::batch`: batch identity, payloads, cancellation
 *   - `dispatch::dispatcher`: worker pool, retries, reflect, reassembly
 * - `stages`: optimize/split/translate adapters over the dispatcher
 * - `providers`: LLM collaborator clients (OpenAI-compatible, mock)
 * - `asr`: speech-recognition collaborator contract
 * - `pipeline`: stage orchestration
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod asr;
pub mod dispatch;
pub mod errors;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod stages;
pub mod subtitle;

// Re-export main types for easier usage
pub use app_config::Config;
pub use dispatch::{BatchDispatcher, BatchTransform, CancelFlag, DispatchOptions};
pub use errors::{AppError, BatchError, ConfigError, ProviderError};
pub use language_utils::{LanguageClass, TargetLanguage};
pub use pipeline::Pipeline;
pub use subtitle::{Segment, SubtitleDocument, Word};
