use std::fmt;
use anyhow::{Result, anyhow};

// @module: Core subtitle data model

// @struct: Single transcribed word with timing
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Word text, trimmed and non-empty
    pub text: String,
}

impl Word {
    // @creates: Validated word
    // @validates: Time order and non-empty text
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Result<Self> {
        if start > end {
            return Err(anyhow!("Invalid word timing: start {} > end {}", start, end));
        }

        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Empty word text at {:.3}s", start));
        }

        Ok(Word {
            start,
            end,
            text: trimmed.to_string(),
        })
    }
}

/// Single subtitle segment with timing and optional word-level detail
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// 1-based index, unique within a document
    pub index: usize,

    /// Start time in seconds
    pub start: f64,

    /// End time in seconds, strictly after start
    pub end: f64,

    /// Segment text
    pub text: String,

    /// Ordered word-level timing, when the source provides it
    pub words: Option<Vec<Word>>,
}

impl Segment {
    /// Creates a new segment without word-level detail
    pub fn new(index: usize, start: f64, end: f64, text: impl Into<String>) -> Self {
        Segment {
            index,
            start,
            end,
            text: text.into(),
            words: None,
        }
    }

    // @creates: Validated segment
    // @validates: Strict time order, non-empty text, word span containment
    pub fn new_validated(
        index: usize,
        start: f64,
        end: f64,
        text: impl Into<String>,
        words: Option<Vec<Word>>,
    ) -> Result<Self> {
        if start >= end {
            return Err(anyhow!(
                "Invalid time range for segment {}: start {} >= end {}",
                index, start, end
            ));
        }

        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Empty subtitle text for segment {}", index));
        }

        if let Some(words) = &words {
            if let (Some(first), Some(last)) = (words.first(), words.last()) {
                // Word spans may adjoin the segment span but not escape it outright.
                const SLACK: f64 = 0.5;
                if first.start < start - SLACK || last.end > end + SLACK {
                    return Err(anyhow!(
                        "Word span [{:.3}, {:.3}] escapes segment {} span [{:.3}, {:.3}]",
                        first.start, last.end, index, start, end
                    ));
                }
            }
        }

        Ok(Segment {
            index,
            start,
            end,
            text: trimmed.to_string(),
            words,
        })
    }

    /// Segment duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Returns a copy with replaced text, keeping timing and index
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.text = text.into();
        copy
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {:.3} --> {:.3}: {}", self.index, self.start, self.end, self.text)
    }
}

/// Ordered collection of subtitle segments.
///
/// Invariants: segments ordered by non-decreasing start, indices contiguous
/// 1..N after any whole-document transform, no duplicate index.
#[derive(Debug, Clone, Default)]
pub struct SubtitleDocument {
    /// List of subtitle segments
    pub segments: Vec<Segment>,
}

impl SubtitleDocument {
    /// Create an empty document
    pub fn new() -> Self {
        SubtitleDocument { segments: Vec::new() }
    }

    /// Build a document from raw segments, restoring the ordering and
    /// index invariants
    pub fn from_segments(mut segments: Vec<Segment>) -> Self {
        segments.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));
        let mut doc = SubtitleDocument { segments };
        doc.renumber();
        doc
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the document has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Reassign contiguous 1-based indices in document order
    pub fn renumber(&mut self) {
        for (i, segment) in self.segments.iter_mut().enumerate() {
            segment.index = i + 1;
        }
    }

    /// Heuristic check for word-level granularity, where each segment holds a
    /// single recognized word rather than a sentence. Mirrors how upstream ASR
    /// word-timestamp output looks: almost every entry is a handful of
    /// characters long.
    pub fn is_word_level(&self) -> bool {
        if self.segments.is_empty() {
            return false;
        }

        let short = self.segments.iter()
            .filter(|s| s.text.trim().chars().count() <= 4)
            .count();

        short * 10 >= self.segments.len() * 8
    }

    /// Flatten the document into timed words, preferring word-level detail
    /// and falling back to one pseudo-word per segment
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

    /// Total text length in characters, whitespace excluded
    pub fn char_count(&self) -> usize {
        self.segments.iter()
            .map(|s| s.text.chars().filter(|c| !c.is_whitespace()).count())
            .sum()
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Document")?;
        writeln!(f, "Segments: {}", self.segments.len())?;
        Ok(())
    }
}
