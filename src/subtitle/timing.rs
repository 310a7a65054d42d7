/*!
 * Display timing smoothing.
 *
 * Closes sub-threshold gaps between adjacent segments by extending the
 * earlier segment's end part-way toward the next start, which stops rapid
 * blank/show flicker on screen. Start times are never touched and gaps are
 * never widened.
 */

use crate::subtitle::model::SubtitleDocument;

/// Tuning knobs for timing smoothing
#[derive(Debug, Clone)]
pub struct TimingOptions {
    /// Gaps shorter than this (milliseconds) get closed
    pub flicker_threshold_ms: u64,

    /// How far toward the next start the boundary moves, in (0, 1).
    /// Heuristic constant, kept configurable on purpose.
    pub split_ratio: f64,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            flicker_threshold_ms: 1000,
            split_ratio: 0.75,
        }
    }
}

/// Run one left-to-right smoothing pass over the document.
///
/// Each adjacent pair is evaluated against already-adjusted values; earlier
/// pairs are never revisited. An adjustment that would leave a segment with
/// `start >= end` is skipped for that pair.
pub fn smooth_timing(doc: &SubtitleDocument, options: &TimingOptions) -> SubtitleDocument {
    let mut out = doc.clone();
    if out.segments.len() < 2 {
        return out;
    }

    let threshold = options.flicker_threshold_ms as f64 / 1000.0;

    for i in 1..out.segments.len() {
        let gap = out.segments[i].start - out.segments[i - 1].end;
        if gap <= 0.0 || gap >= threshold {
            continue;
        }

        let new_end = out.segments[i - 1].end + options.split_ratio * gap;
        if new_end <= out.segments[i - 1].start {
            continue;
        }
        out.segments[i - 1].end = new_end;
    }

    out
}
