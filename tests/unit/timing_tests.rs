/*!
 * Tests for display timing smoothing
 */

use subpolish::subtitle::timing::{TimingOptions, smooth_timing};
use crate::common;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Test a sub-threshold gap gets partially closed
#[test]
fn test_smooth_timing_withSmallGap_shouldExtendPreviousEnd() {
    let doc = common::document(&[(0.0, 1.0, "first"), (1.05, 2.0, "second")]);
    let smoothed = smooth_timing(&doc, &TimingOptions::default());

    // 0.05s gap closed by 75%: new end is 1.0 + 0.75 * 0.05.
    assert!(approx(smoothed.segments[0].end, 1.0375));
    assert!(approx(smoothed.segments[1].start, 1.05));
    assert!(approx(smoothed.segments[1].end, 2.0));
}

/// Test a gap at or above the threshold is left alone
#[test]
fn test_smooth_timing_withLargeGap_shouldNotChange() {
    let doc = common::document(&[(0.0, 1.0, "first"), (2.5, 3.5, "second")]);
    let smoothed = smooth_timing(&doc, &TimingOptions::default());

    assert!(approx(smoothed.segments[0].end, 1.0));
}

/// Test overlapping or touching segments are left alone
#[test]
fn test_smooth_timing_withNoGap_shouldNotChange() {
    let doc = common::document(&[(0.0, 1.0, "a"), (1.0, 2.0, "b"), (1.8, 3.0, "c")]);
    let smoothed = smooth_timing(&doc, &TimingOptions::default());

    assert!(approx(smoothed.segments[0].end, 1.0));
    assert!(approx(smoothed.segments[1].end, 2.0));
}

/// Test start times are never modified
#[test]
fn test_smooth_timing_shouldNeverMoveStarts() {
    let doc = common::document(&[
        (0.0, 0.5, "a"),
        (0.6, 1.1, "b"),
        (1.2, 1.7, "c"),
        (2.0, 2.5, "d"),
    ]);
    let smoothed = smooth_timing(&doc, &TimingOptions::default());

    for (before, after) in doc.segments.iter().zip(smoothed.segments.iter()) {
        assert!(approx(before.start, after.start));
        assert!(after.end >= before.end);
    }
}

/// Test the pass evaluates gaps against already-adjusted values
#[test]
fn test_smooth_timing_withChainedGaps_shouldUseAdjustedValues() {
    let doc = common::document(&[(0.0, 1.0, "a"), (1.4, 2.0, "b"), (2.4, 3.0, "c")]);
    let smoothed = smooth_timing(&doc, &TimingOptions::default());

    assert!(approx(smoothed.segments[0].end, 1.3));
    assert!(approx(smoothed.segments[1].end, 2.3));
    assert!(approx(smoothed.segments[2].end, 3.0));
}

/// Test custom threshold and ratio are honored
#[test]
fn test_smooth_timing_withCustomOptions_shouldApplyThem() {
    let doc = common::document(&[(0.0, 1.0, "a"), (1.2, 2.0, "b")]);
    let options = TimingOptions {
        flicker_threshold_ms: 100,
        split_ratio: 0.5,
    };

    // 200ms gap is above the 100ms threshold now.
    let smoothed = smooth_timing(&doc, &options);
    assert!(approx(smoothed.segments[0].end, 1.0));

    let options = TimingOptions {
        flicker_threshold_ms: 500,
        split_ratio: 0.5,
    };
    let smoothed = smooth_timing(&doc, &options);
    assert!(approx(smoothed.segments[0].end, 1.1));
}

/// Test single-segment and empty documents pass through
#[test]
fn test_smooth_timing_withShortDocuments_shouldPassThrough() {
    let single = common::document(&[(0.0, 1.0, "only")]);
    assert_eq!(smooth_timing(&single, &TimingOptions::default()).len(), 1);

    let empty = common::document(&[]);
    assert!(smooth_timing(&empty, &TimingOptions::default()).is_empty());
}
