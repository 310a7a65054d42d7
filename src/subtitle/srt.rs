use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use anyhow::{Result, Context, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle::model::{Segment, SubtitleDocument};

// @module: SRT reading and writing

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

/// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format seconds as an SRT timestamp, rounded to millisecond precision
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round().max(0.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse SRT file content into a subtitle document
pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<SubtitleDocument> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read subtitle file: {}", path.as_ref().display()))?;
    parse_srt_string(&content)
}

/// Parse an SRT format string into a subtitle document
pub fn parse_srt_string(content: &str) -> Result<SubtitleDocument> {
    let mut segments: Vec<Segment> = Vec::new();

    // State for the entry under construction
    let mut current_index: Option<usize> = None;
    let mut current_span: Option<(u64, u64)> = None;
    let mut current_text = String::new();
    let mut line_count = 0;

    let mut finish_entry = |index: usize, span: (u64, u64), text: &str| {
        let (start_ms, end_ms) = span;
        let start = start_ms as f64 / 1000.0;
        let end = end_ms as f64 / 1000.0;
        match Segment::new_validated(index, start, end, text, None) {
            Ok(segment) => segments.push(segment),
            Err(e) => warn!("Skipping invalid subtitle entry {}: {}", index, e),
        }
    };

    for line in content.lines() {
        line_count += 1;
        let trimmed = line.trim();

        // A blank line closes the entry under construction.
        if trimmed.is_empty() {
            if let (Some(index), Some(span)) = (current_index, current_span) {
                if !current_text.is_empty() {
                    finish_entry(index, span, &current_text);
                    current_index = None;
                    current_span = None;
                    current_text.clear();
                }
            }
            continue;
        }

        if current_index.is_none() && current_text.is_empty() {
            if let Ok(num) = trimmed.parse::<usize>() {
                current_index = Some(num);
                continue;
            }
        }

        if current_index.is_some() && current_span.is_none() {
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                match (capture_to_ms(&caps, 1), capture_to_ms(&caps, 5)) {
                    (Ok(start_ms), Ok(end_ms)) => {
                        current_span = Some((start_ms, end_ms));
                        continue;
                    }
                    _ => {
                        warn!("Invalid timestamp format at line {}: {}", line_count, trimmed);
                    }
                }
            }
        }

        if current_index.is_some() && current_span.is_some() {
            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(trimmed);
        } else {
            warn!("Unexpected text at line {} before index or timestamp: {}", line_count, trimmed);
        }
    }

    // Flush the trailing entry.
    if let (Some(index), Some(span)) = (current_index, current_span) {
        if !current_text.is_empty() {
            finish_entry(index, span, &current_text);
        }
    }

    if segments.is_empty() {
        return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
    }

    let mut overlap_count = 0;
    for i in 0..segments.len().saturating_sub(1) {
        if segments[i].end > segments[i + 1].start {
            overlap_count += 1;
        }
    }
    if overlap_count > 0 {
        warn!("Found {} overlapping subtitle entries", overlap_count);
    }

    Ok(SubtitleDocument::from_segments(segments))
}

/// Serialize a document to SRT text
pub fn to_srt_string(doc: &SubtitleDocument) -> String {
    let mut out = String::new();
    for segment in &doc.segments {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            segment.index,
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            segment.text
        ));
    }
    out
}

/// Write a document to an SRT file, creating parent directories as needed
pub fn write_srt_file<P: AsRef<Path>>(doc: &SubtitleDocument, path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
    file.write_all(to_srt_string(doc).as_bytes())?;

    Ok(())
}

fn capture_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64> {
    let hours: u64 = caps.get(start_idx)
        .map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let minutes: u64 = caps.get(start_idx + 1)
        .map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let seconds: u64 = caps.get(start_idx + 2)
        .map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let millis: u64 = caps.get(start_idx + 3)
        .map_or(0, |m| m.as_str().parse().unwrap_or(0));

    Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
}
