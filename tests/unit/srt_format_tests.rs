/*!
 * Tests for SRT parsing and formatting
 */

use anyhow::Result;
use subpolish::subtitle::srt::{
    format_timestamp, parse_srt_file, parse_srt_string, parse_timestamp, to_srt_string,
    write_srt_file,
};
use crate::common;

/// Test timestamp parsing
#[test]
fn test_parse_timestamp_withValidTimestamp_shouldReturnMilliseconds() {
    assert_eq!(parse_timestamp("01:23:45,678").unwrap(), 5_025_678);
    assert_eq!(parse_timestamp("00:00:00,000").unwrap(), 0);
}

/// Test timestamp parsing rejects malformed input
#[test]
fn test_parse_timestamp_withInvalidComponents_shouldFail() {
    assert!(parse_timestamp("00:61:00,000").is_err());
    assert!(parse_timestamp("not a timestamp").is_err());
}

/// Test timestamp formatting rounds to milliseconds
#[test]
fn test_format_timestamp_withSubMillisecondValue_shouldRound() {
    assert_eq!(format_timestamp(1.0375), "00:00:01,038");
    assert_eq!(format_timestamp(0.0), "00:00:00,000");
    assert_eq!(format_timestamp(5025.678), "01:23:45,678");
}

/// Test parsing a well-formed SRT string
#[test]
fn test_parse_srt_string_withValidContent_shouldParseAllEntries() {
    let doc = parse_srt_string(common::SAMPLE_SRT).unwrap();

    assert_eq!(doc.len(), 3);
    assert_eq!(doc.segments[0].text, "This is a test subtitle.");
    assert_eq!(doc.segments[0].start, 1.0);
    assert_eq!(doc.segments[2].end, 14.0);
    let indices: Vec<usize> = doc.segments.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

/// Test multi-line subtitle text is joined with newlines
#[test]
fn test_parse_srt_string_withMultiLineText_shouldJoinLines() {
    let content = "1\n00:00:01,000 --> 00:00:03,000\nFirst line\nSecond line\n";
    let doc = parse_srt_string(content).unwrap();

    assert_eq!(doc.len(), 1);
    assert_eq!(doc.segments[0].text, "First line\nSecond line");
}

/// Test invalid entries are skipped rather than failing the whole parse
#[test]
fn test_parse_srt_string_withOneInvalidEntry_shouldSkipIt() {
    let content = "1\n00:00:05,000 --> 00:00:02,000\nInverted timing\n\n2\n00:00:06,000 --> 00:00:08,000\nValid entry\n";
    let doc = parse_srt_string(content).unwrap();

    assert_eq!(doc.len(), 1);
    assert_eq!(doc.segments[0].text, "Valid entry");
    assert_eq!(doc.segments[0].index, 1);
}

/// Test content without any valid entry is an error
#[test]
fn test_parse_srt_string_withNoValidEntries_shouldFail() {
    assert!(parse_srt_string("just some prose, not SRT").is_err());
    assert!(parse_srt_string("").is_err());
}

/// Test serializing a document to SRT text
#[test]
fn test_to_srt_string_shouldFormatEntries() {
    let doc = common::document(&[(1.0, 4.0, "Hello"), (5.0, 9.0, "World")]);
    let srt = to_srt_string(&doc);

    assert!(srt.contains("1\n00:00:01,000 --> 00:00:04,000\nHello\n"));
    assert!(srt.contains("2\n00:00:05,000 --> 00:00:09,000\nWorld\n"));
}

/// Test file round trip keeps content at millisecond fidelity
#[test]
fn test_srt_file_round_trip_shouldPreserveEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("out.srt");

    let doc = common::document(&[(1.0375, 4.25, "Hello there"), (5.5, 9.125, "General")]);
    write_srt_file(&doc, &path)?;

    let parsed = parse_srt_file(&path)?;
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.segments[0].text, "Hello there");
    // 1.0375s rounds to 1.038s on the way out.
    assert!((parsed.segments[0].start - 1.038).abs() < 1e-9);
    assert!((parsed.segments[1].end - 9.125).abs() < 1e-9);

    Ok(())
}

/// Test parsing a file created on disk
#[test]
fn test_parse_srt_file_withSampleFile_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "sample.srt", common::SAMPLE_SRT)?;

    let doc = parse_srt_file(&path)?;
    assert_eq!(doc.len(), 3);

    Ok(())
}

/// Test parsing a missing file fails with context
#[test]
fn test_parse_srt_file_withMissingFile_shouldFail() {
    assert!(parse_srt_file("/nonexistent/missing.srt").is_err());
}
