//! 端到端流水线测试：文本文件 -> 章节音频 -> manifest

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

use audiobook::application::pipeline::{OutputLayout, PipelineConfig};
use audiobook::application::ports::{AudioFormat, TtsError, VoiceProviderPort};
use audiobook::config::{OutputConfig, ProviderKind, TtsConfig};
use audiobook::infrastructure::adapters::{
    generated_files, read_manifest, write_manifest, BookManifest, CompositeDocumentParser,
    SymphoniaProbe, VoiceProviderFactory,
};
use audiobook::{AudiobookPipeline, ErrorReport, Severity};

const BOOK: &str = "A Tale\nby Nobody\n\n\
Chapter 1\nIt was the best of times.\n\n\
Chapter 2\nIt was the worst of times.\n\n\
Chapter 3\nIt was the age of wisdom.\n";

fn silent_provider() -> Arc<dyn VoiceProviderPort> {
    let tts = TtsConfig {
        provider: ProviderKind::Silent,
        ..Default::default()
    };
    VoiceProviderFactory::create(&tts, &OutputConfig::default()).unwrap()
}

fn write_book(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[tokio::test]
async fn test_text_book_to_wav_chapters() {
    let temp_dir = tempdir().unwrap();
    let source = write_book(temp_dir.path(), "a_tale.txt", BOOK);
    let output = temp_dir.path().join("out");

    let pipeline = AudiobookPipeline::new(
        Arc::new(CompositeDocumentParser::with_defaults()),
        silent_provider(),
        PipelineConfig::default(),
    )
    .with_probe(Arc::new(SymphoniaProbe::new()));

    let outcome = pipeline.run(&source, &output).await;

    assert_eq!(outcome.error, ErrorReport::none());
    let document = outcome.document.unwrap();
    assert_eq!(document.title().as_str(), "A Tale");
    assert_eq!(document.chapter_count(), 3);
    for chapter in document.chapters() {
        assert!(chapter.duration_secs().unwrap() > 0.0);
    }

    let layout = OutputLayout::new(&output);
    let files = generated_files(&document).await;
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["chapter_01.wav", "chapter_02.wav", "chapter_03.wav"]);

    let manifest = BookManifest::from_document(&document, layout.root(), AudioFormat::Wav, &outcome.error);
    write_manifest(&layout.manifest_path(), &manifest).await.unwrap();
    let stored = read_manifest(&layout.manifest_path()).await.unwrap();
    assert_eq!(stored.status, Severity::None);
    assert_eq!(stored.chapters.len(), 3);
    assert_eq!(stored.chapters[1].title, "Chapter 2");
    assert_eq!(stored.chapters[1].file, PathBuf::from("chapters/chapter_02.wav"));
}

/// 对指定章节正文返回服务错误，其余委托给 silent 引擎
struct FlakyProvider {
    inner: Arc<dyn VoiceProviderPort>,
    failing_text: &'static str,
}

#[async_trait]
impl VoiceProviderPort for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn generate(&self, text: &str, destination: &Path) -> Result<PathBuf, TtsError> {
        if text.contains(self.failing_text) {
            std::fs::write(destination, b"partial").unwrap();
            return Err(TtsError::ServiceError("HTTP 503".to_string()));
        }
        self.inner.generate(text, destination).await
    }
}

#[tokio::test]
async fn test_partial_failure_keeps_original_numbers() {
    let temp_dir = tempdir().unwrap();
    let source = write_book(temp_dir.path(), "a_tale.md", BOOK);
    let output = temp_dir.path().join("out");

    let provider = Arc::new(FlakyProvider {
        inner: silent_provider(),
        failing_text: "worst",
    });
    let config = PipelineConfig {
        max_concurrent: 2,
        ..Default::default()
    };
    let pipeline = AudiobookPipeline::new(
        Arc::new(CompositeDocumentParser::with_defaults()),
        provider,
        config,
    );

    let outcome = pipeline.run(&source, &output).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.error, ErrorReport::warning("1 chapters failed: [2]"));
    let document = outcome.document.unwrap();
    let numbers: Vec<_> = document
        .chapters()
        .iter()
        .map(|c| c.number())
        .collect();
    assert_eq!(numbers, vec![1, 3]);

    let files = generated_files(&document).await;
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["chapter_01.wav", "chapter_03.wav"]);

    let mut on_disk: Vec<_> = std::fs::read_dir(output.join("chapters"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    on_disk.sort();
    assert_eq!(on_disk, vec!["chapter_01.wav", "chapter_03.wav"]);
}

#[tokio::test]
async fn test_unsupported_document_is_fatal() {
    let temp_dir = tempdir().unwrap();
    let source = write_book(temp_dir.path(), "a_tale.epub", BOOK);
    let output = temp_dir.path().join("out");

    let pipeline = AudiobookPipeline::new(
        Arc::new(CompositeDocumentParser::with_defaults()),
        silent_provider(),
        PipelineConfig::default(),
    );

    let outcome = pipeline.run(&source, &output).await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.error.kind, Severity::Fatal);
    assert!(outcome.error.message.contains("Unsupported document format"));
    assert!(!output.exists());
}
