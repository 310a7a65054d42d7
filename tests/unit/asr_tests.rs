/*!
 * Tests for the speech-recognition collaborator contract
 */

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use subpolish::app_config::Config;
use subpolish::asr::{SpeechRecognizer, Transcription};
use subpolish::dispatch::batch::CancelFlag;
use subpolish::pipeline::Pipeline;
use subpolish::subtitle::model::Word;
use crate::common::word;

/// Canned recognizer returning a fixed word stream
struct FixedRecognizer {
    words: Vec<Word>,
    language: String,
}

#[async_trait]
impl SpeechRecognizer for FixedRecognizer {
    async fn transcribe(&self, _audio: &Path) -> Result<Transcription> {
        Ok(Transcription {
            words: self.words.clone(),
            language: self.language.clone(),
            confidence: 0.98,
        })
    }
}

/// Test a transcription views as a word-level document
#[test]
fn test_into_document_withTimedWords_shouldProduceWordLevelDocument() {
    let transcription = Transcription {
        words: vec![word(0.0, 0.4, "hello"), word(0.4, 0.8, "world")],
        language: "en".to_string(),
        confidence: 0.9,
    };

    let doc = transcription.into_document();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.segments[0].text, "hello");
    assert_eq!(doc.segments[0].words.as_ref().unwrap().len(), 1);
    let indices: Vec<usize> = doc.segments.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2]);
}

/// Test zero-duration words still yield segments with start before end
#[test]
fn test_into_document_withZeroDurationWord_shouldKeepStartBeforeEnd() {
    let transcription = Transcription {
        words: vec![word(1.0, 1.0, "hi"), word(1.0, 1.5, "there")],
        language: "en".to_string(),
        confidence: 0.9,
    };

    let doc = transcription.into_document();
    for segment in &doc.segments {
        assert!(
            segment.start < segment.end,
            "segment {} has start {} >= end {}",
            segment.index,
            segment.start,
            segment.end
        );
    }
}

/// Test the pipeline segments recognizer output with the detected language
#[tokio::test]
async fn test_run_transcription_withCjkDetection_shouldUseCjkRules() -> Result<()> {
    let recognizer = FixedRecognizer {
        words: vec![
            word(0.0, 0.3, "你"),
            word(0.3, 0.6, "好"),
            word(0.6, 0.9, "。"),
        ],
        language: "zh".to_string(),
    };

    let transcription = recognizer.transcribe(Path::new("audio.wav")).await?;

    // Configured source language stays "en"; the detected tag wins.
    let pipeline = Pipeline::new(Config::default())?;
    let polished = pipeline
        .run_transcription(transcription, &CancelFlag::new(), None)
        .await?;

    assert_eq!(polished.len(), 1);
    assert_eq!(polished.segments[0].text, "你好。");
    assert!((polished.segments[0].start - 0.0).abs() < 1e-9);
    assert!((polished.segments[0].end - 0.9).abs() < 1e-9);

    Ok(())
}
