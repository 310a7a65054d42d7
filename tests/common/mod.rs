/*!
 * Common test utilities for the subpolish test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

use subpolish::dispatch::batch::Batch;
use subpolish::subtitle::model::{Segment, SubtitleDocument, Word};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Builds a timed word without going through validation
pub fn word(start: f64, end: f64, text: &str) -> Word {
    Word {
        start,
        end,
        text: text.to_string(),
    }
}

/// Builds a document from (start, end, text) triples with 1-based indices
pub fn document(entries: &[(f64, f64, &str)]) -> SubtitleDocument {
    let segments = entries
        .iter()
        .enumerate()
        .map(|(i, (start, end, text))| Segment::new(i + 1, *start, *end, *text))
        .collect();
    SubtitleDocument { segments }
}

/// Wraps a whole document as a single batch at position 0
pub fn batch_of(doc: &SubtitleDocument) -> Batch {
    Batch {
        position: 0,
        segments: doc.segments.clone(),
    }
}

/// Sample sentence-level SRT content with three entries
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";
