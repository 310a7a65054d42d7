/*!
 * Tests for language utilities
 */

use subpolish::errors::ConfigError;
use subpolish::language_utils::{LanguageClass, TargetLanguage, language_name_from_tag};

/// Test CJK classification for 2- and 3-letter tags
#[test]
fn test_language_class_withCjkTags_shouldClassifyAsCjk() {
    assert_eq!(LanguageClass::from_tag("zh"), LanguageClass::Cjk);
    assert_eq!(LanguageClass::from_tag("ja"), LanguageClass::Cjk);
    assert_eq!(LanguageClass::from_tag("ko"), LanguageClass::Cjk);
    assert_eq!(LanguageClass::from_tag("zho"), LanguageClass::Cjk);
    assert_eq!(LanguageClass::from_tag("jpn"), LanguageClass::Cjk);
    assert_eq!(LanguageClass::from_tag("yue"), LanguageClass::Cjk);
}

/// Test non-CJK and unknown tags classify as space-delimited
#[test]
fn test_language_class_withOtherTags_shouldClassifyAsSpaceDelimited() {
    assert_eq!(LanguageClass::from_tag("en"), LanguageClass::SpaceDelimited);
    assert_eq!(LanguageClass::from_tag("fr"), LanguageClass::SpaceDelimited);
    assert_eq!(LanguageClass::from_tag("deu"), LanguageClass::SpaceDelimited);
    assert_eq!(LanguageClass::from_tag("xx"), LanguageClass::SpaceDelimited);
    assert_eq!(LanguageClass::from_tag(""), LanguageClass::SpaceDelimited);
}

/// Test classification is case- and whitespace-insensitive
#[test]
fn test_language_class_withMixedCase_shouldNormalize() {
    assert_eq!(LanguageClass::from_tag(" ZH "), LanguageClass::Cjk);
    assert_eq!(LanguageClass::from_tag("Ja"), LanguageClass::Cjk);
}

/// Test target language lookup is case-insensitive
#[test]
fn test_target_language_parse_withMixedCase_shouldResolve() {
    assert_eq!(
        TargetLanguage::parse("simplified chinese").unwrap(),
        TargetLanguage::SimplifiedChinese
    );
    assert_eq!(
        TargetLanguage::parse("FRENCH").unwrap(),
        TargetLanguage::French
    );
    assert_eq!(
        TargetLanguage::parse("  Japanese  ").unwrap(),
        TargetLanguage::Japanese
    );
}

/// Test native spellings resolve to the same variants
#[test]
fn test_target_language_parse_withNativeSpellings_shouldResolve() {
    assert_eq!(
        TargetLanguage::parse("简体中文").unwrap(),
        TargetLanguage::SimplifiedChinese
    );
    assert_eq!(
        TargetLanguage::parse("日本語").unwrap(),
        TargetLanguage::Japanese
    );
    assert_eq!(
        TargetLanguage::parse("zh-hant").unwrap(),
        TargetLanguage::TraditionalChinese
    );
}

/// Test an unrecognized name is an explicit error
#[test]
fn test_target_language_parse_withUnknownName_shouldFail() {
    let error = TargetLanguage::parse("Klingon").unwrap_err();
    assert!(matches!(error, ConfigError::UnrecognizedLanguage(name) if name == "Klingon"));
}

/// Test every listed language parses from its own display name
#[test]
fn test_target_language_all_shouldRoundTripThroughDisplayName() {
    for language in TargetLanguage::ALL {
        let parsed = TargetLanguage::parse(language.display_name()).unwrap();
        assert_eq!(parsed, language);
    }
}

/// Test target language classes
#[test]
fn test_target_language_class_shouldMatchScript() {
    assert_eq!(TargetLanguage::SimplifiedChinese.class(), LanguageClass::Cjk);
    assert_eq!(TargetLanguage::Korean.class(), LanguageClass::Cjk);
    assert_eq!(TargetLanguage::German.class(), LanguageClass::SpaceDelimited);
}

/// Test language name resolution from ISO codes
#[test]
fn test_language_name_from_tag_withValidCodes_shouldReturnNames() {
    assert_eq!(language_name_from_tag("en").unwrap(), "English");
    assert_eq!(language_name_from_tag("fra").unwrap(), "French");
    assert!(language_name_from_tag("zz").is_err());
}
