/*!
 * Translate stage: map each segment to the target language.
 *
 * With reflect mode on, the dispatcher calls `reflect` with the phase-1
 * draft; the reflection prompt carries both source and draft so the model
 * can critique and refine its own output.
 */

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::dispatch::batch::{Batch, BatchPayload};
use crate::dispatch::dispatcher::BatchTransform;
use crate::errors::BatchError;
use crate::language_utils::TargetLanguage;
use crate::providers::LlmClient;
use crate::stages::{batch_json, map_json, parse_text_map, require_non_empty};

/// Batched subtitle translation with an optional reflection pass
pub struct TranslateStage {
    /// LLM collaborator
    client: Arc<dyn LlmClient>,

    /// Language to translate into
    target: TargetLanguage,

    /// Optional free-text instruction (terminology, style)
    instruction: Option<String>,
}

impl TranslateStage {
    /// Create a translate stage against the given client
    pub fn new(
        client: Arc<dyn LlmClient>,
        target: TargetLanguage,
        instruction: Option<String>,
    ) -> Self {
        Self {
            client,
            target,
            instruction,
        }
    }

    fn with_instruction(&self, prompt: String) -> String {
        match &self.instruction {
            Some(instruction) if !instruction.trim().is_empty() => {
                format!("{}\n\nAdditional instructions:\n{}", prompt, instruction.trim())
            }
            _ => prompt,
        }
    }

    fn draft_prompt(&self) -> String {
        self.with_instruction(format!(
            "You are a professional subtitle translator. The input is a JSON \
             object mapping subtitle numbers to source text. Translate every \
             entry into {}. Keep translations concise enough to read as \
             subtitles and preserve the meaning and tone. Respond with a JSON \
             object containing exactly the same keys and the translated text \
             as values, and nothing else.",
            self.target.display_name()
        ))
    }

    fn reflect_prompt(&self) -> String {
        self.with_instruction(format!(
            "You are a professional subtitle translator reviewing your own \
             draft. The input JSON has a \"source\" object with the original \
             text and a \"draft\" object with a first-pass translation into \
             {}. Critique each draft entry for accuracy, fluency, and \
             subtitle readability, then refine it. Respond with a JSON object \
             containing exactly the same keys as \"source\" and the refined \
             translation as values, and nothing else.",
            self.target.display_name()
        ))
    }
}

#[async_trait]
impl BatchTransform for TranslateStage {
    fn name(&self) -> &'static str {
        "translate"
    }

    async fn run(&self, batch: &Batch) -> Result<BatchPayload, BatchError> {
        let response = self.client.chat(&self.draft_prompt(), &batch_json(batch)).await?;

        let map = parse_text_map(&response)?;
        require_non_empty(&map)?;

        Ok(BatchPayload::Texts(map))
    }

    async fn reflect(&self, batch: &Batch, draft: &BatchPayload) -> Result<BatchPayload, BatchError> {
        let BatchPayload::Texts(draft_map) = draft else {
            return Err(BatchError::Validation(
                "translate reflect expects a text payload".to_string(),
            ));
        };

        let user = json!({
            "source": serde_json::from_str::<serde_json::Value>(&batch_json(batch))
                .unwrap_or_default(),
            "draft": serde_json::from_str::<serde_json::Value>(&map_json(draft_map))
                .unwrap_or_default(),
        })
        .to_string();

        let response = self.client.chat(&self.reflect_prompt(), &user).await?;

        let map = parse_text_map(&response)?;
        require_non_empty(&map)?;

        Ok(BatchPayload::Texts(map))
    }
}
