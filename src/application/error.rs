//! 应用层错误定义
//!
//! 流水线各阶段的致命错误，在阶段边界转换为 `ErrorReport`

use thiserror::Error;

use crate::application::ports::ParseError;
use crate::domain::SplitError;

/// 流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 文档无法读取或解析
    #[error("Failed to parse document: {0}")]
    Parse(#[from] ParseError),

    /// 文档没有可提取的文本
    #[error("File contains no data to extract")]
    EmptyDocument,

    /// 章节切分失败
    #[error("Failed to split chapters: {0}")]
    Split(#[from] SplitError),

    /// 阶段缺少文档（状态机被错误驱动）
    #[error("No document available for stage {0}")]
    MissingDocument(&'static str),

    /// 输出目录无法创建
    #[error("Failed to prepare output directory {path}: {reason}")]
    OutputDirectory { path: String, reason: String },

    /// 所有章节合成失败
    #[error("all chapters failed")]
    AllChaptersFailed,
}

impl PipelineError {
    pub fn output_directory(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::OutputDirectory {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
