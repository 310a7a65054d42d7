/*!
 * LLM provider clients.
 *
 * This module contains the collaborator contract the batch stages speak,
 * plus concrete clients:
 * - OpenAI-compatible chat completions API (also covers local servers)
 * - Scripted mock client for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Chat-completion collaborator used by all batch stages.
///
/// A client is an explicit object passed to adapters at construction, never
/// ambient process-wide state, so distinct configurations can run
/// concurrently without interfering.
#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    /// Send one system + user prompt pair and return the raw completion text
    ///
    /// # Arguments
    /// * `system` - The system prompt framing the task
    /// * `user` - The user message carrying the batch content
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The completion text or an error
    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

pub mod mock;
pub mod openai;
