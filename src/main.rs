//! Audiobook - 文档转有声书命令行
//!
//! - generate: 解析 -> 切分章节 -> 合成音频 -> manifest
//! - list-voices: 列出语音引擎可用音色
//! - version: 版本信息

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use audiobook::application::pipeline::OutputLayout;
use audiobook::application::ports::AudioFormat;
use audiobook::config::{load_config_from_path, print_config, validate_config, AppConfig, ProviderKind};
use audiobook::domain::book::Document;
use audiobook::infrastructure::adapters::{
    generated_files, write_manifest, BookManifest, CompositeDocumentParser, SymphoniaProbe,
    VoiceProviderFactory,
};
use audiobook::infrastructure::init_logging;
use audiobook::AudiobookPipeline;

/// Convert PDF and text documents into chapter-by-chapter audiobooks
#[derive(Parser, Debug)]
#[command(name = "audiobook")]
#[command(about = "Convert documents into chapter-by-chapter audiobooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an audiobook from a PDF or text file
    Generate(GenerateArgs),

    /// List the voices offered by a provider
    ListVoices {
        /// Provider to query (http, espeak, silent)
        #[arg(long)]
        provider: Option<ProviderKind>,

        /// Configuration file path
        #[arg(long, env = "AUDIOBOOK_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input document (.pdf, .txt, .md)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory (default: ./audiobooks/<file name>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Voice name
    #[arg(short, long)]
    voice: Option<String>,

    /// Audio format (wav, mp3, ogg, flac, opus)
    #[arg(short, long)]
    format: Option<AudioFormat>,

    /// Speech rate multiplier (0.5 - 2.0)
    #[arg(short, long)]
    speed: Option<f32>,

    /// Chapter heading pattern (regular expression)
    #[arg(short = 'p', long = "pattern")]
    pattern: Option<String>,

    /// Voice provider (http, espeak, silent)
    #[arg(long, conflicts_with = "offline")]
    provider: Option<ProviderKind>,

    /// Use the offline espeak-ng engine
    #[arg(long)]
    offline: bool,

    /// Number of chapters synthesized at the same time
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// Configuration file path
    #[arg(long, env = "AUDIOBOOK_CONFIG")]
    config: Option<PathBuf>,
}

impl GenerateArgs {
    /// 命令行参数覆盖配置
    fn apply(&self, config: &mut AppConfig) {
        if let Some(voice) = &self.voice {
            config.tts.voice = voice.clone();
        }
        if let Some(speed) = self.speed {
            config.tts.speed = speed;
        }
        if let Some(provider) = self.provider {
            config.tts.provider = provider;
        }
        if self.offline {
            config.tts.provider = ProviderKind::Espeak;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(output) = &self.output {
            config.output.directory = Some(output.clone());
        }
        if let Some(pattern) = &self.pattern {
            config.chapter_detection.pattern = pattern.clone();
        }
        if let Some(jobs) = self.jobs {
            config.pipeline.max_concurrent = jobs;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args).await,
        Commands::ListVoices { provider, config } => {
            list_voices(provider, config.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("audiobook {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn generate(args: GenerateArgs) -> anyhow::Result<ExitCode> {
    let mut config = load_config_from_path(args.config.as_deref())
        .context("Failed to load config")?;
    args.apply(&mut config);
    validate_config(&config).context("Invalid options")?;

    init_logging(&config.log);
    print_config(&config);

    let output_dir = config.output.book_directory(&args.input);

    let provider = VoiceProviderFactory::create(&config.tts, &config.output)
        .context("Failed to create voice provider")?;
    if !provider.health_check().await {
        tracing::warn!(provider = %provider.name(), "Voice provider health check failed");
    }

    let pipeline = AudiobookPipeline::new(
        Arc::new(CompositeDocumentParser::with_defaults()),
        provider,
        config.pipeline_config(),
    )
    .with_probe(Arc::new(SymphoniaProbe::new()));

    let outcome = pipeline.run(&args.input, &output_dir).await;

    if outcome.error.is_fatal() {
        tracing::error!(error = %outcome.error.message, "Audiobook generation failed");
        return Ok(ExitCode::FAILURE);
    }

    let layout = OutputLayout::new(&output_dir);

    if config.pipeline.write_manifest {
        if let Some(document) = &outcome.document {
            let manifest = BookManifest::from_document(
                document,
                layout.root(),
                config.output.format,
                &outcome.error,
            );
            if let Err(e) = write_manifest(&layout.manifest_path(), &manifest).await {
                tracing::warn!(error = %e, "Failed to write manifest");
            }
        }
    }

    if let Some(document) = &outcome.document {
        log_summary(document, &layout.chapters_dir()).await;
    }

    if outcome.error.is_warning() {
        tracing::warn!(warning = %outcome.error.message, "Audiobook generated with warnings");
    } else {
        tracing::info!(output = %output_dir.display(), "Audiobook generated successfully");
    }

    Ok(ExitCode::SUCCESS)
}

/// 记录本次生成的章节文件
async fn log_summary(document: &Document, chapters_dir: &Path) {
    let files = generated_files(document).await;
    tracing::info!(count = files.len(), dir = %chapters_dir.display(), "Generated files");
    for file in files {
        tracing::info!("  {} ({:.2} MB)", file.name, file.size_mb());
    }
}

async fn list_voices(provider: Option<ProviderKind>, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config_from_path(config_path).context("Failed to load config")?;
    if let Some(provider) = provider {
        config.tts.provider = provider;
    }

    init_logging(&config.log);

    let provider = VoiceProviderFactory::create(&config.tts, &config.output)
        .context("Failed to create voice provider")?;
    let voices = provider
        .list_voices()
        .await
        .with_context(|| format!("Failed to list voices for {}", provider.name()))?;

    if voices.is_empty() {
        println!("No voices reported by {}", provider.name());
    }
    for voice in voices {
        println!("{}", voice);
    }
    Ok(())
}
