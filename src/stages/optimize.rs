/*!
 * Optimize stage: correct speech-recognition errors per segment.
 *
 * The whole batch travels in one prompt so the model sees surrounding
 * context, and an optional reference/style instruction steers terminology.
 */

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::batch::{Batch, BatchPayload};
use crate::dispatch::dispatcher::BatchTransform;
use crate::errors::BatchError;
use crate::providers::LlmClient;
use crate::stages::{batch_json, parse_text_map, require_non_empty};

const SYSTEM_PROMPT: &str = "\
You are a subtitle proofreader. The input is a JSON object mapping subtitle \
numbers to machine-transcribed text. Correct recognition errors: wrong \
homophones, broken words, misheard names, missing punctuation. Keep the \
original language, meaning, and tone. Do not merge, split, translate, or \
reorder entries. Respond with a JSON object containing exactly the same keys \
and the corrected text as values, and nothing else.";

/// Transcription-error correction over batched segments
pub struct OptimizeStage {
    /// LLM collaborator
    client: Arc<dyn LlmClient>,

    /// Optional reference content or style instruction appended to the
    /// system prompt
    reference: Option<String>,
}

impl OptimizeStage {
    /// Create an optimize stage against the given client
    pub fn new(client: Arc<dyn LlmClient>, reference: Option<String>) -> Self {
        Self { client, reference }
    }

    fn system_prompt(&self) -> String {
        match &self.reference {
            Some(reference) if !reference.trim().is_empty() => {
                format!("{}\n\nReference material:\n{}", SYSTEM_PROMPT, reference.trim())
            }
            _ => SYSTEM_PROMPT.to_string(),
        }
    }
}

#[async_trait]
impl BatchTransform for OptimizeStage {
    fn name(&self) -> &'static str {
        "optimize"
    }

    async fn run(&self, batch: &Batch) -> Result<BatchPayload, BatchError> {
        let response = self.client.chat(&self.system_prompt(), &batch_json(batch)).await?;

        let map = parse_text_map(&response)?;
        require_non_empty(&map)?;

        Ok(BatchPayload::Texts(map))
    }
}
