/*!
 * Subtitle data model and the pure text/timing passes.
 *
 * - `model`: word/segment/document types and their invariants
 * - `srt`: SRT parsing and serialization at millisecond precision
 * - `segmenter`: rule-based word stream to sentence grouping
 * - `timing`: flicker-reducing gap smoothing
 */

pub mod model;
pub mod segmenter;
pub mod srt;
pub mod timing;

pub use model::{Segment, SubtitleDocument, Word};
pub use segmenter::{SegmenterOptions, segment_words, strip_trailing_punctuation};
pub use timing::{TimingOptions, smooth_timing};
