/*!
 * Sentence segmentation for word-level transcripts.
 *
 * Pure rule-based pass that groups a stream of timed words into natural
 * sentences, without any LLM involvement. Break decisions are evaluated in
 * order: sentence-terminal punctuation, clause punctuation past the width
 * limit, then a forced break for unbroken runs.
 */

use crate::language_utils::LanguageClass;
use crate::subtitle::model::{Segment, SubtitleDocument, Word};

/// Sentence-terminal punctuation that always ends a sentence
const SENTENCE_TERMINALS: &[char] = &['.', '!', '?', '…', '。', '！', '？', '～', '．'];

/// Clause separators that permit a soft break once the line is full
const CLAUSE_SEPARATORS: &[char] = &[',', ';', ':', '，', '；', '：', '、'];

/// Tuning knobs for the segmenter
#[derive(Debug, Clone)]
pub struct SegmenterOptions {
    /// Maximum characters per line before soft breaks apply
    pub max_chars: usize,

    /// Multiplier over max_chars at which a break is forced regardless of
    /// punctuation. Heuristic constant, kept configurable on purpose.
    pub forced_break_ratio: f64,
}

impl SegmenterOptions {
    /// Default widths per language class: 30 chars for CJK, 80 otherwise
    pub fn for_class(class: LanguageClass) -> Self {
        let max_chars = match class {
            LanguageClass::Cjk => 30,
            LanguageClass::SpaceDelimited => 80,
        };
        Self {
            max_chars,
            forced_break_ratio: 1.3,
        }
    }
}

/// Render buffered words the way the target language joins them
fn render(buffer: &[&Word], class: LanguageClass) -> String {
    let parts: Vec<&str> = buffer.iter().map(|w| w.text.as_str()).collect();
    match class {
        LanguageClass::Cjk => parts.concat(),
        LanguageClass::SpaceDelimited => parts.join(" "),
    }
}

fn ends_with_any(text: &str, marks: &[char]) -> bool {
    text.chars().next_back().is_some_and(|c| marks.contains(&c))
}

/// Group ordered timed words into sentence-level segments.
///
/// Every non-empty input word lands in exactly one output sentence, in
/// chronological order; whitespace-only words are skipped. Each sentence
/// spans [first word start, last word end].
pub fn segment_words(
    words: &[Word],
    class: LanguageClass,
    options: &SegmenterOptions,
) -> SubtitleDocument {
    let mut sentences: Vec<Segment> = Vec::new();
    let mut buffer: Vec<&Word> = Vec::new();

    let forced_limit = (options.max_chars as f64 * options.forced_break_ratio).ceil() as usize;

    let mut flush = |buffer: &mut Vec<&Word>| {
        if buffer.is_empty() {
            return;
        }
        let text = render(buffer, class);
        let start = buffer[0].start;
        let end = buffer[buffer.len() - 1].end;
        let owned: Vec<Word> = buffer.iter().map(|w| (*w).clone()).collect();
        sentences.push(Segment {
            index: sentences.len() + 1,
            start,
            end,
            text,
            words: Some(owned),
        });
        buffer.clear();
    };

    for word in words {
        if word.text.trim().is_empty() {
            continue;
        }
        buffer.push(word);

        let rendered = render(&buffer, class);
        let length = rendered.chars().count();

        // Hard break: the buffer ends on sentence-terminal punctuation.
        if ends_with_any(&rendered, SENTENCE_TERMINALS) {
            flush(&mut buffer);
            continue;
        }

        // Soft break: line is full and this word closes a clause.
        if length >= options.max_chars && ends_with_any(&word.text, CLAUSE_SEPARATORS) {
            flush(&mut buffer);
            continue;
        }

        // Forced break: unbroken run past the hard width limit.
        if length >= forced_limit {
            flush(&mut buffer);
        }
    }

    flush(&mut buffer);

    SubtitleDocument::from_segments(sentences)
}

/// Strip sentence-terminal and clause punctuation from the end of every
/// segment's display text. A segment that is punctuation only keeps its text,
/// and word-level detail is left untouched.
pub fn strip_trailing_punctuation(doc: &SubtitleDocument) -> SubtitleDocument {
    let mut out = doc.clone();
    for segment in &mut out.segments {
        let stripped = segment.text.trim_end_matches(|c: char| {
            SENTENCE_TERMINALS.contains(&c) || CLAUSE_SEPARATORS.contains(&c)
        });
        let stripped = stripped.trim_end();
        if !stripped.is_empty() {
            segment.text = stripped.to_string();
        }
    }
    out
}
