/*!
 * End-to-end pipeline tests against the mock collaborator
 */

use std::sync::Arc;

use anyhow::Result;
use subpolish::app_config::Config;
use subpolish::dispatch::batch::CancelFlag;
use subpolish::pipeline::Pipeline;
use subpolish::providers::mock::MockClient;
use subpolish::subtitle::srt::{parse_srt_file, parse_srt_string, write_srt_file};
use crate::common;

const WORD_LEVEL_SRT: &str = "1
00:00:00,000 --> 00:00:00,400
Hi

2
00:00:00,400 --> 00:00:00,800
all.

3
00:00:01,000 --> 00:00:01,400
Go

4
00:00:01,400 --> 00:00:01,800
on

5
00:00:01,800 --> 00:00:02,200
now.
";

/// Test word-level input is grouped into sentences and timing smoothed
#[tokio::test]
async fn test_pipeline_withWordLevelSrt_shouldGroupAndSmooth() -> Result<()> {
    let doc = parse_srt_string(WORD_LEVEL_SRT)?;
    assert!(doc.is_word_level());

    let pipeline = Pipeline::new(Config::default())?;
    let polished = pipeline.run(&doc, &CancelFlag::new(), None).await?;

    assert_eq!(polished.len(), 2);
    assert_eq!(polished.segments[0].text, "Hi all.");
    assert_eq!(polished.segments[1].text, "Go on now.");

    // The 0.2s gap between sentences gets closed by 75%.
    assert!((polished.segments[0].end - 0.95).abs() < 1e-9);
    assert!((polished.segments[1].start - 1.0).abs() < 1e-9);

    Ok(())
}

/// Test the optimize stage rewrites text through the collaborator
#[tokio::test]
async fn test_pipeline_withOptimizeStage_shouldRewriteText() -> Result<()> {
    let doc = common::document(&[
        (1.0, 4.0, "This sentence was transcribed badly."),
        (5.0, 9.0, "And this one has a misheard name."),
    ]);

    let mut config = Config::default();
    config.stages.optimize = true;

    let pipeline = Pipeline::with_client(config, Arc::new(MockClient::echo("fixed: ")))?;
    let polished = pipeline.run(&doc, &CancelFlag::new(), None).await?;

    assert_eq!(polished.len(), 2);
    assert_eq!(polished.segments[0].text, "fixed: This sentence was transcribed badly.");
    assert_eq!(polished.segments[1].text, "fixed: And this one has a misheard name.");
    assert_eq!(polished.segments[0].start, 1.0);

    Ok(())
}

/// Test translation with a failing reflect pass keeps the draft
#[tokio::test]
async fn test_pipeline_withReflectFailure_shouldKeepDraftTranslation() -> Result<()> {
    let doc = common::document(&[
        (1.0, 4.0, "A sentence to translate carefully."),
        (5.0, 9.0, "Another sentence to translate."),
    ]);

    let mut config = Config::default();
    config.target_language = Some("French".to_string());
    config.stages.reflect = true;

    let pipeline = Pipeline::with_client(config, Arc::new(MockClient::reflect_failing("FR: ")))?;
    let polished = pipeline.run(&doc, &CancelFlag::new(), None).await?;

    assert_eq!(polished.segments[0].text, "FR: A sentence to translate carefully.");
    assert_eq!(polished.segments[1].text, "FR: Another sentence to translate.");

    Ok(())
}

/// Test a cancelled run skips LLM stages but still returns a document
#[tokio::test]
async fn test_pipeline_withCancelledFlag_shouldSkipLlmStages() -> Result<()> {
    let doc = common::document(&[
        (1.0, 4.0, "Original text stays untouched here."),
        (5.0, 9.0, "This one stays untouched as well."),
    ]);

    let mut config = Config::default();
    config.stages.optimize = true;

    let client = Arc::new(MockClient::echo("changed: "));
    let counter = client.call_counter();
    let pipeline = Pipeline::with_client(config, client)?;

    let cancel = CancelFlag::new();
    cancel.cancel();

    let polished = pipeline.run(&doc, &cancel, None).await?;

    assert_eq!(polished.len(), 2);
    assert_eq!(polished.segments[0].text, "Original text stays untouched here.");
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);

    Ok(())
}

/// Test a full SRT file round trip through the pipeline
#[tokio::test]
async fn test_pipeline_endToEnd_withSrtFiles_shouldWritePolishedOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "input.srt", common::SAMPLE_SRT)?;
    let output = temp_dir.path().join("output.srt");

    let doc = parse_srt_file(&input)?;

    let mut config = Config::default();
    config.stages.optimize = true;

    let pipeline = Pipeline::with_client(config, Arc::new(MockClient::echo("ok: ")))?;
    let polished = pipeline.run(&doc, &CancelFlag::new(), None).await?;

    write_srt_file(&polished, &output)?;
    let reparsed = parse_srt_file(&output)?;

    assert_eq!(reparsed.len(), 3);
    assert_eq!(reparsed.segments[0].text, "ok: This is a test subtitle.");
    assert_eq!(reparsed.segments[2].text, "ok: For testing purposes.");

    Ok(())
}

/// Test the punctuation-stripping pass runs after the other stages
#[tokio::test]
async fn test_pipeline_withStripPunctuation_shouldDropTrailingMarks() -> Result<()> {
    let doc = common::document(&[
        (1.0, 4.0, "This sentence ends with a period."),
        (5.0, 9.0, "This one, with a comma,"),
    ]);

    let mut config = Config::default();
    config.stages.strip_punctuation = true;

    let pipeline = Pipeline::new(config)?;
    let polished = pipeline.run(&doc, &CancelFlag::new(), None).await?;

    assert_eq!(polished.segments[0].text, "This sentence ends with a period");
    assert_eq!(polished.segments[1].text, "This one, with a comma");

    Ok(())
}

/// Test pipeline construction fails fast on invalid configuration
#[test]
fn test_pipeline_new_withMissingCredential_shouldFail() {
    let mut config = Config::default();
    config.stages.optimize = true;

    assert!(Pipeline::new(config).is_err());
}
