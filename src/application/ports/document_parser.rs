//! Document Parser Port - 文档解析抽象
//!
//! 从源文件中提取标题、作者和原始文本，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::book::Document;

/// 文档解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read document: {0}")]
    Unreadable(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),
}

/// Document Parser Port
///
/// 文档解析器接口
#[async_trait]
pub trait DocumentParserPort: Send + Sync {
    /// 解析文档
    ///
    /// 返回的 Document 尚未切分章节
    async fn parse(&self, path: &Path) -> Result<Document, ParseError>;

    /// 是否能处理该文件（通常按扩展名判断）
    fn supports(&self, path: &Path) -> bool;
}

/// 取小写扩展名
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
