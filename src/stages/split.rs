/*!
 * Split stage: re-segment word-level text into natural sentences.
 *
 * The batch's words are merged into one run of text, the model proposes
 * sentence boundaries, and timestamps are redistributed over the original
 * words by character budget, so the output never invents timing.
 */

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::batch::{Batch, BatchPayload};
use crate::dispatch::dispatcher::BatchTransform;
use crate::errors::BatchError;
use crate::language_utils::LanguageClass;
use crate::providers::LlmClient;
use crate::stages::parse_sentences;
use crate::subtitle::model::{Segment, Word};

/// Minimum duration given to a sentence aligned onto zero-width words
const MIN_SENTENCE_SECS: f64 = 0.01;

/// LLM-driven sentence re-segmentation over batched word-level segments
pub struct SplitStage {
    /// LLM collaborator
    client: Arc<dyn LlmClient>,

    /// Joining/width rules of the source language
    class: LanguageClass,

    /// Target maximum characters per output sentence, advisory for the model
    max_chars: usize,
}

impl SplitStage {
    /// Create a split stage against the given client
    pub fn new(client: Arc<dyn LlmClient>, class: LanguageClass, max_chars: usize) -> Self {
        Self {
            client,
            class,
            max_chars,
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a subtitle segmenter. The input is a run of transcribed \
             text. Split it into natural sentences of at most about {} \
             characters each. Do not rephrase, translate, add, or drop any \
             text: the concatenation of your sentences must reproduce the \
             input exactly, apart from whitespace. Respond with a JSON array \
             of sentence strings and nothing else.",
            self.max_chars
        )
    }

    fn merged_text(&self, words: &[Word]) -> String {
        let parts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        match self.class {
            LanguageClass::Cjk => parts.concat(),
            LanguageClass::SpaceDelimited => parts.join(" "),
        }
    }
}

#[async_trait]
impl BatchTransform for SplitStage {
    fn name(&self) -> &'static str {
        "split"
    }

    async fn run(&self, batch: &Batch) -> Result<BatchPayload, BatchError> {
        let words = batch.words();
        if words.is_empty() {
            return Err(BatchError::Validation("batch has no words to split".to_string()));
        }

        let response = self.client.chat(&self.system_prompt(), &self.merged_text(&words)).await?;
        let sentences = parse_sentences(&response)?;

        let segments = redistribute(&words, &sentences)?;
        Ok(BatchPayload::Segments(segments))
    }
}

fn visible_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Assign each sentence a span by walking the original words and consuming
/// them against the sentence's character budget. The final sentence takes
/// every remaining word, so no timing is lost.
pub(crate) fn redistribute(words: &[Word], sentences: &[String]) -> Result<Vec<Segment>, BatchError> {
    if sentences.len() > words.len() {
        return Err(BatchError::Validation(format!(
            "{} sentences for {} words",
            sentences.len(),
            words.len()
        )));
    }

    let mut segments = Vec::with_capacity(sentences.len());
    let mut cursor = 0usize;

    for (i, sentence) in sentences.iter().enumerate() {
        let remaining_sentences = sentences.len() - i - 1;
        let budget = visible_chars(sentence);

        let first = cursor;
        let mut consumed = 0usize;

        while cursor < words.len() {
            // Leave at least one word for every sentence still to come.
            if cursor > first && words.len() - cursor <= remaining_sentences {
                break;
            }
            if remaining_sentences == 0 || consumed < budget {
                consumed += visible_chars(&words[cursor].text);
                cursor += 1;
            } else {
                break;
            }
        }

        if cursor == first {
            return Err(BatchError::Validation(format!(
                "no words left for sentence {:?}",
                sentence
            )));
        }

        let start = words[first].start;
        let end = words[cursor - 1].end.max(start + MIN_SENTENCE_SECS);

        segments.push(Segment {
            index: i + 1,
            start,
            end,
            text: sentence.clone(),
            words: Some(words[first..cursor].to_vec()),
        });
    }

    Ok(segments)
}
