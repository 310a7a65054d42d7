use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::dispatch::dispatcher::DispatchOptions;
use crate::errors::ConfigError;
use crate::language_utils::{LanguageClass, TargetLanguage};
use crate::subtitle::segmenter::SegmenterOptions;
use crate::subtitle::timing::TimingOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language tag (ISO 639), drives CJK vs space-delimited rules
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language name for the translate stage; translation is skipped
    /// when absent
    #[serde(default)]
    pub target_language: Option<String>,

    /// Enabled processing stages
    #[serde(default)]
    pub stages: StageConfig,

    /// LLM provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Batch dispatch settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Sentence segmenter settings
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// Timing smoothing settings
    #[serde(default)]
    pub timing: TimingConfig,

    /// Free-text reference/instruction passed to LLM stages
    #[serde(default)]
    pub instruction: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Which processing stages run, in pipeline order
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StageConfig {
    /// LLM sentence splitting of word-level input
    #[serde(default)]
    pub split: bool,

    /// LLM transcription-error correction
    #[serde(default)]
    pub optimize: bool,

    /// Two-phase reflect mode for translation
    #[serde(default)]
    pub reflect: bool,

    /// Strip trailing punctuation from every segment after all stages
    #[serde(default)]
    pub strip_punctuation: bool,
}

/// LLM provider configuration (OpenAI-compatible chat completions)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL including version prefix
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

/// Batch dispatch configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Worker pool size
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Segments per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retries per batch after the first failed attempt
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Base backoff between retries (milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Allowed duration drift for re-segmentation payloads (milliseconds)
    #[serde(default = "default_duration_epsilon_ms")]
    pub duration_epsilon_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: default_batch_size(),
            retry_limit: default_retry_limit(),
            retry_backoff_ms: default_retry_backoff_ms(),
            duration_epsilon_ms: default_duration_epsilon_ms(),
        }
    }
}

/// Sentence segmenter configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmenterConfig {
    /// Maximum characters per line for CJK text
    #[serde(default = "default_max_chars_cjk")]
    pub max_chars_cjk: usize,

    /// Maximum characters per line for space-delimited text
    #[serde(default = "default_max_chars_latin")]
    pub max_chars_latin: usize,

    /// Multiplier over max chars at which a break is forced
    #[serde(default = "default_forced_break_ratio")]
    pub forced_break_ratio: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chars_cjk: default_max_chars_cjk(),
            max_chars_latin: default_max_chars_latin(),
            forced_break_ratio: default_forced_break_ratio(),
        }
    }
}

/// Timing smoothing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimingConfig {
    /// Gaps shorter than this (milliseconds) get closed
    #[serde(default = "default_flicker_threshold_ms")]
    pub flicker_threshold_ms: u64,

    /// How far toward the next start the boundary moves, in (0, 1)
    #[serde(default = "default_flicker_split_ratio")]
    pub split_ratio: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            flicker_threshold_ms: default_flicker_threshold_ms(),
            split_ratio: default_flicker_split_ratio(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.3
}

fn default_workers() -> usize {
    4
}

fn default_batch_size() -> usize {
    10
}

fn default_retry_limit() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_duration_epsilon_ms() -> u64 {
    100
}

fn default_max_chars_cjk() -> usize {
    30
}

fn default_max_chars_latin() -> usize {
    80
}

fn default_forced_break_ratio() -> f64 {
    1.3
}

fn default_flicker_threshold_ms() -> u64 {
    1000
}

fn default_flicker_split_ratio() -> f64 {
    0.75
}

impl Config {
    /// Validate the configuration for consistency and required values.
    /// Fatal before any work begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dispatch_options().validate()?;

        if self.segmenter.max_chars_cjk < 1 {
            return Err(ConfigError::InvalidParameter {
                name: "max_chars_cjk",
                value: self.segmenter.max_chars_cjk.to_string(),
            });
        }
        if self.segmenter.max_chars_latin < 1 {
            return Err(ConfigError::InvalidParameter {
                name: "max_chars_latin",
                value: self.segmenter.max_chars_latin.to_string(),
            });
        }
        if !self.segmenter.forced_break_ratio.is_finite() || self.segmenter.forced_break_ratio < 1.0 {
            return Err(ConfigError::InvalidParameter {
                name: "forced_break_ratio",
                value: self.segmenter.forced_break_ratio.to_string(),
            });
        }
        if !self.timing.split_ratio.is_finite()
            || self.timing.split_ratio <= 0.0
            || self.timing.split_ratio >= 1.0
        {
            return Err(ConfigError::InvalidParameter {
                name: "split_ratio",
                value: self.timing.split_ratio.to_string(),
            });
        }

        // Target language must resolve inside the closed set; no silent default.
        if let Some(name) = &self.target_language {
            TargetLanguage::parse(name)?;
        }

        if self.uses_llm() && self.provider.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential(
                "API key is required when optimize/split/translate stages are enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether any LLM-backed stage is enabled
    pub fn uses_llm(&self) -> bool {
        self.stages.optimize || self.stages.split || self.target_language.is_some()
    }

    /// Parsed target language, when translation is configured
    pub fn target(&self) -> Result<Option<TargetLanguage>, ConfigError> {
        self.target_language
            .as_deref()
            .map(TargetLanguage::parse)
            .transpose()
    }

    /// Language class of the source language
    pub fn source_class(&self) -> LanguageClass {
        LanguageClass::from_tag(&self.source_language)
    }

    /// Dispatch options derived from this config (reflect off; stages that
    /// support reflection enable it per dispatch)
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            workers: self.dispatch.workers,
            batch_size: self.dispatch.batch_size,
            retry_limit: self.dispatch.retry_limit,
            retry_backoff_ms: self.dispatch.retry_backoff_ms,
            reflect: false,
            duration_epsilon: self.dispatch.duration_epsilon_ms as f64 / 1000.0,
        }
    }

    /// Segmenter options for the given language class
    pub fn segmenter_options(&self, class: LanguageClass) -> SegmenterOptions {
        let max_chars = match class {
            LanguageClass::Cjk => self.segmenter.max_chars_cjk,
            LanguageClass::SpaceDelimited => self.segmenter.max_chars_latin,
        };
        SegmenterOptions {
            max_chars,
            forced_break_ratio: self.segmenter.forced_break_ratio,
        }
    }

    /// Timing smoothing options
    pub fn timing_options(&self) -> TimingOptions {
        TimingOptions {
            flicker_threshold_ms: self.timing.flicker_threshold_ms,
            split_ratio: self.timing.split_ratio,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: None,
            stages: StageConfig::default(),
            provider: ProviderConfig::default(),
            dispatch: DispatchConfig::default(),
            segmenter: SegmenterConfig::default(),
            timing: TimingConfig::default(),
            instruction: None,
            log_level: LogLevel::default(),
        }
    }
}
