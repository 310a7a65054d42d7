/*!
 * Mock LLM client implementations for testing.
 *
 * This module provides scripted clients that simulate collaborator behavior:
 * - `MockClient::echo(prefix)` - rewrites every batch entry with a prefix
 * - `MockClient::failing()` - always fails with an error
 * - `MockClient::fail_first(n)` - fails the first n calls, then succeeds
 * - `MockClient::fail_once_each(prefix)` - fails the first attempt for every
 *   distinct batch, succeeds on retry
 * - `MockClient::reflect_failing(prefix)` - succeeds for drafts, fails for
 *   reflection prompts
 */

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::LlmClient;

/// Responder signature for fully scripted behavior
pub type Responder = Arc<dyn Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync>;

/// Behavior mode for the mock client
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Parse the user message as an index->text object and echo every value
    /// back with a prefix
    Echo,
    /// Always fail with a request error
    Failing,
    /// Fail the first n calls, echo afterwards
    FailFirst {
        /// Number of leading calls that fail
        failures: usize,
    },
    /// Fail the first attempt for every distinct user message, echo on retry
    FailOnceEach,
    /// Echo for draft prompts, fail when the system prompt is a reflection
    /// prompt
    ReflectFailing,
}

/// Mock LLM client for testing stage and dispatcher behavior
pub struct MockClient {
    /// Behavior mode
    behavior: MockBehavior,
    /// Prefix applied by echo responses
    prefix: String,
    /// Total chat calls observed
    calls: Arc<AtomicUsize>,
    /// User messages already seen, for fail-once-each behavior
    seen: Mutex<HashSet<String>>,
    /// Fully scripted responder, overrides the behavior mode when set
    responder: Option<Responder>,
}

impl std::fmt::Debug for MockClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClient")
            .field("behavior", &self.behavior)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl MockClient {
    /// Create a mock with the given behavior and echo prefix
    pub fn new(behavior: MockBehavior, prefix: impl Into<String>) -> Self {
        Self {
            behavior,
            prefix: prefix.into(),
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Mutex::new(HashSet::new()),
            responder: None,
        }
    }

    /// Echo every entry back with a prefix
    pub fn echo(prefix: impl Into<String>) -> Self {
        Self::new(MockBehavior::Echo, prefix)
    }

    /// Always fail
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, "")
    }

    /// Fail the first `failures` calls, then echo
    pub fn fail_first(failures: usize, prefix: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailFirst { failures }, prefix)
    }

    /// Fail the first attempt for every distinct batch, succeed on retry
    pub fn fail_once_each(prefix: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOnceEach, prefix)
    }

    /// Echo drafts but fail reflection prompts
    pub fn reflect_failing(prefix: impl Into<String>) -> Self {
        Self::new(MockBehavior::ReflectFailing, prefix)
    }

    /// Fully scripted responses
    pub fn scripted(responder: Responder) -> Self {
        Self {
            behavior: MockBehavior::Echo,
            prefix: String::new(),
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Mutex::new(HashSet::new()),
            responder: Some(responder),
        }
    }

    /// Number of chat calls observed so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, for asserting after moves
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Parse the user message as a JSON object and echo values with the
    /// prefix, preserving keys
    fn echo_response(&self, user: &str) -> Result<String, ProviderError> {
        let value: Value = serde_json::from_str(user.trim())
            .map_err(|e| ProviderError::ParseError(format!("mock could not parse user message: {}", e)))?;

        let object = value.as_object()
            .ok_or_else(|| ProviderError::ParseError("mock expected a JSON object".to_string()))?;

        // Reflection prompts nest the source under "source"; echo those too.
        let source = object.get("source").and_then(Value::as_object).unwrap_or(object);

        let mut out = Map::new();
        for (key, value) in source {
            let text = value.as_str().unwrap_or_default();
            out.insert(key.clone(), Value::String(format!("{}{}", self.prefix, text)));
        }

        Ok(Value::Object(out).to_string())
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(responder) = &self.responder {
            return responder(system, user);
        }

        match self.behavior {
            MockBehavior::Echo => self.echo_response(user),
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "mock provider configured to fail".to_string(),
            )),
            MockBehavior::FailFirst { failures } => {
                if call < failures {
                    Err(ProviderError::RequestFailed(format!(
                        "mock failure {} of {}",
                        call + 1,
                        failures
                    )))
                } else {
                    self.echo_response(user)
                }
            }
            MockBehavior::FailOnceEach => {
                let first_attempt = self.seen.lock()
                    .map(|mut seen| seen.insert(user.to_string()))
                    .unwrap_or(false);
                if first_attempt {
                    Err(ProviderError::RequestFailed(
                        "mock first-attempt failure".to_string(),
                    ))
                } else {
                    self.echo_response(user)
                }
            }
            MockBehavior::ReflectFailing => {
                if system.contains("refine") {
                    Err(ProviderError::RequestFailed(
                        "mock reflection failure".to_string(),
                    ))
                } else {
                    self.echo_response(user)
                }
            }
        }
    }
}
