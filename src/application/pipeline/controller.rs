//! Pipeline Controller - 阶段编排
//!
//! 状态: Parsing -> Splitting -> Synthesizing -> Done
//!
//! 路由规则:
//! - Parse 之后: 解析失败或文本为空 -> 致命
//! - Split 之后: 切分失败 -> 致命
//! - Synthesize 之后: 全部失败 -> 致命；部分失败 -> 警告；全部成功 -> 无错误
//!
//! 阶段不会自动重试，出现致命错误后不再执行后续阶段

use std::path::PathBuf;
use std::sync::Arc;

use super::{
    OutputLayout, PipelineConfig, PipelineOutcome, PipelineStage, PipelineState,
    SynthesisIsolator,
};
use crate::application::error::PipelineError;
use crate::application::ports::{AudioProbePort, DocumentParserPort, VoiceProviderPort};
use crate::domain::ChapterSplitter;

/// 有声书流水线
///
/// 语音引擎在构造时注入，运行期间不可替换
pub struct AudiobookPipeline {
    parser: Arc<dyn DocumentParserPort>,
    isolator: SynthesisIsolator,
    config: PipelineConfig,
}

impl AudiobookPipeline {
    pub fn new(
        parser: Arc<dyn DocumentParserPort>,
        provider: Arc<dyn VoiceProviderPort>,
        config: PipelineConfig,
    ) -> Self {
        let isolator = SynthesisIsolator::new(provider).with_max_concurrent(config.max_concurrent);
        Self {
            parser,
            isolator,
            config,
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn AudioProbePort>) -> Self {
        self.isolator = self.isolator.with_probe(probe);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 运行整条流水线
    ///
    /// 不返回 Err：所有失败都体现在结果的错误分级中
    pub async fn run(
        &self,
        source_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> PipelineOutcome {
        let mut state = PipelineState::new(source_path, output_dir, self.config.clone());

        tracing::info!(
            source = %state.source_path.display(),
            output = %state.output_dir.display(),
            provider = %self.isolator.provider_name(),
            "Pipeline started"
        );

        loop {
            state = match state.stage {
                PipelineStage::Parsing => self.parse(state).await.route(PipelineStage::Splitting),
                PipelineStage::Splitting => self.split(state).route(PipelineStage::Synthesizing),
                PipelineStage::Synthesizing => {
                    self.synthesize(state).await.route(PipelineStage::Done)
                }
                PipelineStage::Done => break,
            };

            if state.error.is_fatal() {
                tracing::error!(error = %state.error.message, "Fatal error encountered");
            }
        }

        tracing::info!(
            kind = ?state.error.kind,
            chapters = state.document.as_ref().map_or(0, |d| d.chapter_count()),
            "Pipeline finished"
        );

        state.into_outcome()
    }

    /// 解析文档
    async fn parse(&self, state: PipelineState) -> PipelineState {
        tracing::info!(path = %state.source_path.display(), "Parsing book");

        match self.parser.parse(&state.source_path).await {
            Ok(document) if !document.has_text() => state.fail(PipelineError::EmptyDocument),
            Ok(document) => {
                tracing::info!(title = %document.title(), "Successfully parsed");
                PipelineState {
                    document: Some(document),
                    ..state
                }
            }
            Err(e) => state.fail(e.into()),
        }
    }

    /// 切分章节
    fn split(&self, mut state: PipelineState) -> PipelineState {
        let Some(mut document) = state.document.take() else {
            return state.fail(PipelineError::MissingDocument("splitting"));
        };

        tracing::info!("Splitting book into chapters");

        let result = ChapterSplitter::new(&state.config.chapter_pattern)
            .and_then(|splitter| splitter.split_document(&mut document));

        match result {
            Ok(count) => {
                tracing::info!(chapters = count, "Found chapters");
                state.document = Some(document);
                state
            }
            Err(e) => {
                state.document = Some(document);
                state.fail(e.into())
            }
        }
    }

    /// 合成音频
    async fn synthesize(&self, mut state: PipelineState) -> PipelineState {
        let Some(mut document) = state.document.take() else {
            return state.fail(PipelineError::MissingDocument("synthesizing"));
        };

        let layout = OutputLayout::new(&state.output_dir);
        if let Err(e) = layout.ensure_dirs().await {
            state.document = Some(document);
            return state.fail(PipelineError::output_directory(&layout.chapters_dir(), e));
        }

        let report = self
            .isolator
            .synthesize(document.take_chapters(), &layout, state.config.audio_format)
            .await;

        if report.error.is_warning() {
            tracing::warn!(failed = ?report.failed, "{}", report.error.message);
        }

        document.set_chapters(report.chapters);
        state.document = Some(document);
        state.report(report.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::{ErrorReport, Severity};
    use crate::application::ports::{ParseError, TtsError};
    use crate::domain::book::{Chapter, Document, Title};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// 返回固定文本的解析器
    struct StaticParser {
        text: Option<String>,
    }

    impl StaticParser {
        fn with_text(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Some(text.to_string()),
            })
        }
    }

    #[async_trait]
    impl DocumentParserPort for StaticParser {
        async fn parse(&self, path: &Path) -> Result<Document, ParseError> {
            match &self.text {
                Some(text) => Ok(Document::new(
                    Title::from_path(path),
                    Some("Anonymous".to_string()),
                    path,
                    text.clone(),
                )),
                None => Err(ParseError::NotFound(path.display().to_string())),
            }
        }

        fn supports(&self, _path: &Path) -> bool {
            true
        }
    }

    /// 正文包含 "FAIL" 的章节合成失败
    #[derive(Default)]
    struct MarkerProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VoiceProviderPort for MarkerProvider {
        fn name(&self) -> &str {
            "marker"
        }

        async fn generate(&self, text: &str, destination: &Path) -> Result<PathBuf, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("FAIL") {
                return Err(TtsError::ServiceError("HTTP 500".to_string()));
            }
            tokio::fs::write(destination, text.as_bytes())
                .await
                .map_err(|e| TtsError::IoError(e.to_string()))?;
            Ok(destination.to_path_buf())
        }
    }

    fn pipeline(parser: Arc<StaticParser>, provider: Arc<MarkerProvider>) -> AudiobookPipeline {
        AudiobookPipeline::new(parser, provider, PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_full_success() {
        let temp_dir = tempdir().unwrap();
        let provider = Arc::new(MarkerProvider::default());
        let pipeline = pipeline(
            StaticParser::with_text("Preface\nChapter 1\nAlpha\nChapter 2\nBeta"),
            provider.clone(),
        );

        let outcome = pipeline.run("/books/my_book.txt", temp_dir.path()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.error, ErrorReport::none());
        let document = outcome.document.unwrap();
        assert_eq!(document.title().as_str(), "My Book");
        assert_eq!(document.chapter_count(), 2);
        assert!(document.chapters().iter().all(Chapter::has_audio));
        assert!(temp_dir.path().join("chapters/chapter_01.wav").exists());
        assert!(temp_dir.path().join("chapters/chapter_02.wav").exists());
    }

    #[tokio::test]
    async fn test_partial_failure_reduces_document() {
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(
            StaticParser::with_text("Chapter 1\nA\nChapter 2\nFAIL\nChapter 3\nC"),
            Arc::new(MarkerProvider::default()),
        );

        let outcome = pipeline.run("/books/b.txt", temp_dir.path()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.error, ErrorReport::warning("1 chapters failed: [2]"));
        let document = outcome.document.unwrap();
        let numbers: Vec<usize> = document.chapters().iter().map(Chapter::number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_all_failed_is_fatal() {
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(
            StaticParser::with_text("Chapter 1\nFAIL\nChapter 2\nFAIL again"),
            Arc::new(MarkerProvider::default()),
        );

        let outcome = pipeline.run("/books/c.txt", temp_dir.path()).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error, ErrorReport::fatal("all chapters failed"));
        assert_eq!(outcome.document.unwrap().chapter_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_skips_remaining_stages() {
        let temp_dir = tempdir().unwrap();
        let provider = Arc::new(MarkerProvider::default());
        let pipeline = pipeline(Arc::new(StaticParser { text: None }), provider.clone());

        let outcome = pipeline
            .run("/books/missing.pdf", temp_dir.path().join("out"))
            .await;

        assert_eq!(outcome.error.kind, Severity::Fatal);
        assert!(outcome.error.message.contains("File not found"));
        assert!(outcome.document.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(!temp_dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_blank_document_is_fatal() {
        let temp_dir = tempdir().unwrap();
        let provider = Arc::new(MarkerProvider::default());
        let pipeline = pipeline(StaticParser::with_text(" \n \t"), provider.clone());

        let outcome = pipeline.run("/books/blank.txt", temp_dir.path()).await;

        assert_eq!(
            outcome.error,
            ErrorReport::fatal("File contains no data to extract")
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_fatal_at_split() {
        let temp_dir = tempdir().unwrap();
        let provider = Arc::new(MarkerProvider::default());
        let config = PipelineConfig {
            chapter_pattern: "(unclosed".to_string(),
            ..Default::default()
        };
        let pipeline = AudiobookPipeline::new(
            StaticParser::with_text("Chapter 1\nA"),
            provider.clone(),
            config,
        );

        let outcome = pipeline.run("/books/d.txt", temp_dir.path()).await;

        assert!(outcome.error.is_fatal());
        assert!(outcome.error.message.starts_with("Failed to split chapters"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        // 解析结果仍然保留在最终状态中
        assert_eq!(outcome.document.unwrap().chapter_count(), 0);
    }

    #[tokio::test]
    async fn test_no_boundaries_synthesizes_full_book() {
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(
            StaticParser::with_text("A short story without headings."),
            Arc::new(MarkerProvider::default()),
        );

        let outcome = pipeline.run("/books/e.txt", temp_dir.path()).await;

        let document = outcome.document.unwrap();
        assert_eq!(document.chapter_count(), 1);
        assert_eq!(document.chapters()[0].title(), "Full book");
    }
}
