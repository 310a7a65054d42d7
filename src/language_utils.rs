use anyhow::{Result, anyhow};
use isolang::Language;

use crate::errors::ConfigError;

/// Language utilities for subtitle processing
///
/// This module holds the single canonical target-language set used by the
/// translate stage, and the language-class rules that decide how the
/// segmenter joins and measures text (CJK vs space-delimited).
/// Character-joining class of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageClass {
    /// Chinese/Japanese/Korean: no space joining, character-count widths
    Cjk,
    /// Everything else: space joining, character-count widths
    SpaceDelimited,
}

impl LanguageClass {
    /// Classify an ISO 639 language tag (2- or 3-letter, case-insensitive).
    /// Unknown tags classify as space-delimited rather than failing: the
    /// segmenter still produces correct sentences, just with Latin widths.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_lowercase();

        let code_639_3 = match normalized.len() {
            2 => Language::from_639_1(&normalized).map(|l| l.to_639_3().to_string()),
            3 => Language::from_639_3(&normalized).map(|l| l.to_639_3().to_string()),
            _ => None,
        };

        match code_639_3.as_deref() {
            Some("zho") | Some("jpn") | Some("kor") | Some("yue") => Self::Cjk,
            _ => Self::SpaceDelimited,
        }
    }
}

/// Supported translation target languages.
///
/// One closed set with a single case-insensitive lookup; an unrecognized
/// name is an explicit configuration error, never a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLanguage {
    SimplifiedChinese,
    TraditionalChinese,
    Cantonese,
    English,
    Japanese,
    Korean,
    French,
    German,
    Spanish,
    Russian,
    Portuguese,
    Italian,
    Dutch,
    Polish,
    Turkish,
    Arabic,
    Thai,
    Vietnamese,
    Indonesian,
}

impl TargetLanguage {
    /// All recognized languages, used for CLI help and error messages
    pub const ALL: [TargetLanguage; 19] = [
        Self::SimplifiedChinese,
        Self::TraditionalChinese,
        Self::Cantonese,
        Self::English,
        Self::Japanese,
        Self::Korean,
        Self::French,
        Self::German,
        Self::Spanish,
        Self::Russian,
        Self::Portuguese,
        Self::Italian,
        Self::Dutch,
        Self::Polish,
        Self::Turkish,
        Self::Arabic,
        Self::Thai,
        Self::Vietnamese,
        Self::Indonesian,
    ];

    /// English display name, also the name used inside LLM prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SimplifiedChinese => "Simplified Chinese",
            Self::TraditionalChinese => "Traditional Chinese",
            Self::Cantonese => "Cantonese",
            Self::English => "English",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::French => "French",
            Self::German => "German",
            Self::Spanish => "Spanish",
            Self::Russian => "Russian",
            Self::Portuguese => "Portuguese",
            Self::Italian => "Italian",
            Self::Dutch => "Dutch",
            Self::Polish => "Polish",
            Self::Turkish => "Turkish",
            Self::Arabic => "Arabic",
            Self::Thai => "Thai",
            Self::Vietnamese => "Vietnamese",
            Self::Indonesian => "Indonesian",
        }
    }

    /// Language class of the target, used when re-wrapping translated text
    pub fn class(&self) -> LanguageClass {
        match self {
            Self::SimplifiedChinese
            | Self::TraditionalChinese
            | Self::Cantonese
            | Self::Japanese
            | Self::Korean => LanguageClass::Cjk,
            _ => LanguageClass::SpaceDelimited,
        }
    }

    /// Look up a language by name, case-insensitively. Accepts the English
    /// display name plus a few common native spellings.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let key = name.trim().to_lowercase();
        let found = match key.as_str() {
            "simplified chinese" | "chinese" | "简体中文" | "zh-hans" => Some(Self::SimplifiedChinese),
            "traditional chinese" | "繁体中文" | "zh-hant" => Some(Self::TraditionalChinese),
            "cantonese" | "粤语" => Some(Self::Cantonese),
            "english" => Some(Self::English),
            "japanese" | "日本語" => Some(Self::Japanese),
            "korean" | "韩语" => Some(Self::Korean),
            "french" => Some(Self::French),
            "german" => Some(Self::German),
            "spanish" => Some(Self::Spanish),
            "russian" => Some(Self::Russian),
            "portuguese" => Some(Self::Portuguese),
            "italian" => Some(Self::Italian),
            "dutch" => Some(Self::Dutch),
            "polish" => Some(Self::Polish),
            "turkish" => Some(Self::Turkish),
            "arabic" => Some(Self::Arabic),
            "thai" => Some(Self::Thai),
            "vietnamese" => Some(Self::Vietnamese),
            "indonesian" => Some(Self::Indonesian),
            _ => None,
        };

        found.ok_or_else(|| ConfigError::UnrecognizedLanguage(name.trim().to_string()))
    }
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Get the English language name for an ISO 639 code
pub fn language_name_from_tag(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    };

    language
        .map(|l| l.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
