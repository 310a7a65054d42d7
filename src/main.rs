// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};

use subpolish::app_config::{Config, LogLevel};
use subpolish::dispatch::batch::{BatchReport, BatchStatus, CancelFlag};
use subpolish::dispatch::dispatcher::ProgressObserver;
use subpolish::pipeline::Pipeline;
use subpolish::subtitle::srt::{parse_srt_file, write_srt_file};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// subpolish - LLM-assisted subtitle post-processing
///
/// Reads an SRT file, optionally corrects, re-splits and translates it
/// through an OpenAI-compatible chat API, and writes the polished SRT.
#[derive(Parser, Debug)]
#[command(name = "subpolish")]
#[command(version = "0.3.0")]
#[command(about = "LLM-assisted subtitle post-processing tool")]
#[command(long_about = "subpolish groups word-level subtitles into sentences, smooths display \
timing, and can correct, re-split, and translate subtitle text through an \
OpenAI-compatible chat API.

EXAMPLES:
    subpolish input.srt output.srt                        # Segment and smooth timing only
    subpolish -O input.srt output.srt                     # Also correct transcription errors
    subpolish -t \"Simplified Chinese\" input.srt out.srt   # Translate
    subpolish -t French --reflect input.srt out.srt       # Two-phase translation
    subpolish -O --threads 8 --batch-size 20 input.srt out.srt")]
struct CommandLineOptions {
    /// Input SRT file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output SRT file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Correct transcription errors with the LLM
    #[arg(short = 'O', long)]
    optimize: bool,

    /// Re-split segment boundaries with the LLM
    #[arg(long)]
    split: bool,

    /// Target language to translate into (e.g. "French", "Simplified Chinese")
    #[arg(short, long, value_name = "LANGUAGE")]
    translate: Option<String>,

    /// Use the two-phase reflect mode for translation
    #[arg(long, requires = "translate")]
    reflect: bool,

    /// Strip trailing punctuation from the final subtitles
    #[arg(long)]
    strip_punctuation: bool,

    /// Source language code (e.g. 'en', 'zh', 'ja')
    #[arg(short, long)]
    source_language: Option<String>,

    /// API key for the chat endpoint
    #[arg(short = 'k', long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the chat endpoint, including version prefix
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Model name
    #[arg(short, long)]
    model: Option<String>,

    /// Number of concurrent request workers
    #[arg(long)]
    threads: Option<usize>,

    /// Segments per request batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Extra reference material or instruction passed to the LLM
    #[arg(short, long)]
    instruction: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            use std::io::Write;
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        use std::io::Write;
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Merge command line options into a configuration
fn build_config(cli: &CommandLineOptions) -> Config {
    let mut config = Config::default();

    if let Some(source) = &cli.source_language {
        config.source_language = source.clone();
    }
    config.target_language = cli.translate.clone();
    config.stages.optimize = cli.optimize;
    config.stages.split = cli.split;
    config.stages.reflect = cli.reflect;
    config.stages.strip_punctuation = cli.strip_punctuation;

    if let Some(key) = &cli.api_key {
        config.provider.api_key = key.clone();
    }
    if let Some(url) = &cli.base_url {
        config.provider.endpoint = url.clone();
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(threads) = cli.threads {
        config.dispatch.workers = threads;
    }
    if let Some(batch_size) = cli.batch_size {
        config.dispatch.batch_size = batch_size;
    }
    config.instruction = cli.instruction.clone();
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }

    config
}

/// Progress bar fed by per-batch completion reports
fn progress_observer(bar: ProgressBar) -> ProgressObserver {
    Arc::new(move |report: &BatchReport| {
        bar.inc(1);
        if report.status == BatchStatus::Failed {
            bar.set_message(format!(
                "batch {}..{} kept original text",
                report.first_index, report.last_index
            ));
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after parsing arguments if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    let config = build_config(&cli);

    log::set_max_level(level_filter(&config.log_level));

    if !cli.input.is_file() {
        return Err(anyhow!("Input file not found: {}", cli.input.display()));
    }

    let document = parse_srt_file(&cli.input)?;
    info!("Loaded {} segments from {}", document.len(), cli.input.display());

    let uses_llm = config.uses_llm();
    let pipeline = Pipeline::new(config)?;

    // Batch counts vary per stage, so the bar runs as a ticker rather than a
    // fixed-length gauge.
    let observer = if uses_llm && !document.is_empty() {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {pos} batches done {msg}")?);
        Some(progress_observer(bar))
    } else {
        None
    };

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, finishing in-flight batches");
                cancel.cancel();
            }
        });
    }

    let polished = pipeline.run(&document, &cancel, observer).await?;

    write_srt_file(&polished, &cli.output)?;
    info!("Wrote {} segments to {}", polished.len(), cli.output.display());

    Ok(())
}
