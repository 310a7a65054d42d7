/*!
 * Stage orchestration.
 *
 * Wires the pure passes (segmenter, timing) and the dispatcher-driven LLM
 * stages (optimize, split, translate) into one run over a document, in
 * pipeline order. The LLM client is one explicit object owned here and
 * shared by the stages, so two pipelines with different credentials can run
 * side by side.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use log::info;

use crate::app_config::Config;
use crate::asr::Transcription;
use crate::dispatch::batch::CancelFlag;
use crate::dispatch::dispatcher::{BatchDispatcher, BatchTransform, ProgressObserver};
use crate::errors::ConfigError;
use crate::language_utils::LanguageClass;
use crate::providers::LlmClient;
use crate::providers::openai::OpenAiClient;
use crate::stages::{OptimizeStage, SplitStage, TranslateStage};
use crate::subtitle::model::SubtitleDocument;
use crate::subtitle::segmenter::{segment_words, strip_trailing_punctuation};
use crate::subtitle::timing::smooth_timing;

/// One configured processing pipeline
pub struct Pipeline {
    config: Config,
    client: Option<Arc<dyn LlmClient>>,
}

impl Pipeline {
    /// Build a pipeline from configuration, constructing the provider client
    /// when any LLM stage is enabled. Configuration errors are fatal here,
    /// before any work starts.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let client: Option<Arc<dyn LlmClient>> = if config.uses_llm() {
            Some(Arc::new(
                OpenAiClient::with_timeout(
                    config.provider.api_key.clone(),
                    config.provider.endpoint.clone(),
                    config.provider.model.clone(),
                    Duration::from_secs(config.provider.timeout_secs),
                )
                .temperature(config.provider.temperature),
            ))
        } else {
            None
        };

        Ok(Self { config, client })
    }

    /// Build a pipeline around an injected client. Credential checks are
    /// skipped since the caller supplies the collaborator.
    pub fn with_client(config: Config, client: Arc<dyn LlmClient>) -> Result<Self, ConfigError> {
        let mut relaxed = config.clone();
        relaxed.provider.api_key = "injected".to_string();
        relaxed.validate()?;

        Ok(Self {
            config,
            client: Some(client),
        })
    }

    fn client(&self) -> Result<Arc<dyn LlmClient>> {
        self.client
            .clone()
            .ok_or_else(|| anyhow!("LLM stage enabled but no client configured"))
    }

    /// Run the configured stages over a document.
    ///
    /// Cancellation yields a well-formed partial document; per-batch failures
    /// inside a stage degrade those segments to their pre-stage text.
    pub async fn run(
        &self,
        doc: &SubtitleDocument,
        cancel: &CancelFlag,
        observer: Option<ProgressObserver>,
    ) -> Result<SubtitleDocument> {
        self.run_with_class(doc, self.config.source_class(), cancel, observer)
            .await
    }

    /// Run the configured stages over a recognizer's output, segmenting with
    /// the detected language rather than the configured source language.
    pub async fn run_transcription(
        &self,
        transcription: Transcription,
        cancel: &CancelFlag,
        observer: Option<ProgressObserver>,
    ) -> Result<SubtitleDocument> {
        let class = LanguageClass::from_tag(&transcription.language);
        info!(
            "Recognized {} words as '{}' (confidence {:.2})",
            transcription.words.len(),
            transcription.language,
            transcription.confidence
        );
        let doc = transcription.into_document();
        self.run_with_class(&doc, class, cancel, observer).await
    }

    async fn run_with_class(
        &self,
        doc: &SubtitleDocument,
        class: LanguageClass,
        cancel: &CancelFlag,
        observer: Option<ProgressObserver>,
    ) -> Result<SubtitleDocument> {
        let mut doc = doc.clone();

        // Word-level input gets grouped into sentences before anything else.
        if doc.is_word_level() {
            let words = doc.words();
            info!("Grouping {} words into sentences", words.len());
            doc = segment_words(&words, class, &self.config.segmenter_options(class));
            info!("Segmenter produced {} sentences", doc.len());
        }

        doc = smooth_timing(&doc, &self.config.timing_options());

        if self.config.stages.optimize && !cancel.is_cancelled() {
            info!("Optimizing {} segments", doc.len());
            let stage = OptimizeStage::new(self.client()?, self.config.instruction.clone());
            doc = self.dispatch(&doc, Arc::new(stage), false, cancel, observer.clone()).await?;
        }

        if self.config.stages.split && !cancel.is_cancelled() {
            let max_chars = self.config.segmenter_options(class).max_chars;
            info!("Re-splitting {} segments", doc.len());
            let stage = SplitStage::new(self.client()?, class, max_chars);
            doc = self.dispatch(&doc, Arc::new(stage), false, cancel, observer.clone()).await?;
        }

        if let Some(target) = self.config.target()? {
            if !cancel.is_cancelled() {
                info!("Translating {} segments to {}", doc.len(), target);
                let stage = TranslateStage::new(
                    self.client()?,
                    target,
                    self.config.instruction.clone(),
                );
                doc = self
                    .dispatch(&doc, Arc::new(stage), self.config.stages.reflect, cancel, observer)
                    .await?;
            }
        }

        if self.config.stages.strip_punctuation {
            doc = strip_trailing_punctuation(&doc);
        }

        Ok(doc)
    }

    async fn dispatch(
        &self,
        doc: &SubtitleDocument,
        transform: Arc<dyn BatchTransform>,
        reflect: bool,
        cancel: &CancelFlag,
        observer: Option<ProgressObserver>,
    ) -> Result<SubtitleDocument> {
        let mut options = self.config.dispatch_options();
        options.reflect = reflect;

        let dispatcher = BatchDispatcher::new(options)?;
        let outcome = dispatcher.dispatch(doc, transform, cancel, observer).await;

        let failed = outcome
            .reports
            .iter()
            .filter(|r| r.status == crate::dispatch::batch::BatchStatus::Failed)
            .count();
        if failed > 0 {
            info!("{} of {} batches kept their original text", failed, outcome.reports.len());
        }

        Ok(outcome.document)
    }
}
