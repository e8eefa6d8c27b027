//! Pipeline State - 流水线状态
//!
//! 状态由控制器独占，每个阶段接收当前状态并返回新状态

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::error::PipelineError;
use crate::application::ports::AudioFormat;
use crate::domain::book::Document;
use crate::domain::DEFAULT_CHAPTER_PATTERN;

/// 错误分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 无错误
    #[default]
    None,
    /// 部分成功，输出被裁减但有效
    Warning,
    /// 运行终止，无可用输出
    Fatal,
}

/// 错误报告：分级 + 人类可读消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ErrorReport {
    pub kind: Severity,
    pub message: String,
}

impl ErrorReport {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: Severity::Fatal,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == Severity::Fatal
    }

    pub fn is_warning(&self) -> bool {
        self.kind == Severity::Warning
    }
}

impl From<PipelineError> for ErrorReport {
    fn from(err: PipelineError) -> Self {
        Self::fatal(err.to_string())
    }
}

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Parsing,
    Splitting,
    Synthesizing,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Parsing => "parsing",
            PipelineStage::Splitting => "splitting",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// 流水线配置
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// 章节标题模式
    pub chapter_pattern: String,
    /// 输出音频格式
    pub audio_format: AudioFormat,
    /// 最大并发合成数（1 表示顺序执行）
    pub max_concurrent: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chapter_pattern: DEFAULT_CHAPTER_PATTERN.to_string(),
            audio_format: AudioFormat::Wav,
            max_concurrent: 1,
        }
    }
}

/// 流水线状态
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub stage: PipelineStage,
    pub document: Option<Document>,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub config: PipelineConfig,
    pub error: ErrorReport,
}

impl PipelineState {
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            stage: PipelineStage::Parsing,
            document: None,
            source_path: source_path.into(),
            output_dir: output_dir.into(),
            config,
            error: ErrorReport::none(),
        }
    }

    /// 记录致命错误
    ///
    /// 每次运行只保留第一个致命错误
    pub fn fail(mut self, err: PipelineError) -> Self {
        if !self.error.is_fatal() {
            self.error = err.into();
        }
        self
    }

    /// 记录阶段分级结果（致命错误不会被覆盖）
    pub fn report(mut self, report: ErrorReport) -> Self {
        if !self.error.is_fatal() {
            self.error = report;
        }
        self
    }

    /// 阶段结束后的路由：致命错误直接结束，否则进入下一阶段
    pub fn route(mut self, next: PipelineStage) -> Self {
        self.stage = if self.error.is_fatal() {
            PipelineStage::Done
        } else {
            next
        };
        self
    }

    pub fn into_outcome(self) -> PipelineOutcome {
        PipelineOutcome {
            document: self.document,
            error: self.error,
        }
    }
}

/// 流水线最终结果
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// 最终文档（警告时章节已裁减；解析失败时为空）
    pub document: Option<Document>,
    pub error: ErrorReport,
}

impl PipelineOutcome {
    /// 成功或部分成功
    pub fn is_success(&self) -> bool {
        !self.error.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PipelineState {
        PipelineState::new("/books/a.txt", "/out/a", PipelineConfig::default())
    }

    #[test]
    fn test_route_continues_without_fatal() {
        let state = state().route(PipelineStage::Splitting);
        assert_eq!(state.stage, PipelineStage::Splitting);

        let state = state
            .report(ErrorReport::warning("1 chapters failed: [2]"))
            .route(PipelineStage::Done);
        assert_eq!(state.stage, PipelineStage::Done);
        assert!(state.error.is_warning());
    }

    #[test]
    fn test_fatal_ends_run() {
        let state = state()
            .fail(PipelineError::EmptyDocument)
            .route(PipelineStage::Splitting);

        assert_eq!(state.stage, PipelineStage::Done);
        assert_eq!(state.error.kind, Severity::Fatal);
        assert_eq!(state.error.message, "File contains no data to extract");
    }

    #[test]
    fn test_first_fatal_wins() {
        let state = state()
            .fail(PipelineError::EmptyDocument)
            .fail(PipelineError::AllChaptersFailed)
            .report(ErrorReport::none());

        assert_eq!(state.error.message, "File contains no data to extract");
        assert!(!state.into_outcome().is_success());
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&ErrorReport::warning("x")).unwrap();
        assert_eq!(json, r#"{"kind":"warning","message":"x"}"#);
    }
}
