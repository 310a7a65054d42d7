/*!
 * Speech-recognition collaborator contract.
 *
 * The core never runs a model itself: any recognizer (local binary, remote
 * API) sits behind this trait and hands the pipeline ordered timed words
 * plus a detected-language tag. The segmenter consumes that output directly.
 */

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::subtitle::model::{SubtitleDocument, Word};

/// Minimum duration given to a recognized word whose span is zero-length,
/// so the resulting segments keep `start < end`
const MIN_WORD_SECS: f64 = 0.01;

/// Output of one recognition run
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Ordered timed words
    pub words: Vec<Word>,

    /// Detected language tag (ISO 639)
    pub language: String,

    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl Transcription {
    /// View the transcription as a word-level subtitle document, one segment
    /// per word
    pub fn into_document(self) -> SubtitleDocument {
        let segments = self
            .words
            .into_iter()
            .enumerate()
            .map(|(i, word)| crate::subtitle::model::Segment {
                index: i + 1,
                start: word.start,
                end: word.end.max(word.start + MIN_WORD_SECS),
                text: word.text.clone(),
                words: Some(vec![word]),
            })
            .collect();
        SubtitleDocument { segments }
    }
}

/// Speech recognizer collaborator
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe an audio file into ordered timed words
    async fn transcribe(&self, audio: &Path) -> Result<Transcription>;
}
