//! PDF Parser - 通过 poppler 命令行工具提取文本
//!
//! - 文本: `pdftotext -enc UTF-8 <file> -`，分页符替换为换行
//! - 元数据: `pdfinfo <file>` 的 Title / Author 字段，缺失时标题取自文件名

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::application::ports::{extension_of, DocumentParserPort, ParseError};
use crate::domain::book::{Document, Title};

/// PDF 解析配置
#[derive(Debug, Clone)]
pub struct PdfParserConfig {
    pub pdftotext_binary: String,
    pub pdfinfo_binary: String,
}

impl Default for PdfParserConfig {
    fn default() -> Self {
        Self {
            pdftotext_binary: "pdftotext".to_string(),
            pdfinfo_binary: "pdfinfo".to_string(),
        }
    }
}

/// PDF 元数据
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl PdfMetadata {
    /// 解析 pdfinfo 输出（`Key:   value` 每行一项）
    pub fn parse(output: &str) -> Self {
        let mut metadata = Self::default();
        for line in output.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "Title" => metadata.title = Some(value.to_string()),
                "Author" => metadata.author = Some(value.to_string()),
                _ => {}
            }
        }
        metadata
    }
}

/// PDF 解析器
#[derive(Debug, Default, Clone)]
pub struct PdfDocumentParser {
    config: PdfParserConfig,
}

impl PdfDocumentParser {
    pub fn new(config: PdfParserConfig) -> Self {
        Self { config }
    }

    async fn extract_text(&self, path: &Path) -> Result<String, ParseError> {
        let output = Command::new(&self.config.pdftotext_binary)
            .args(["-enc", "UTF-8"])
            .arg(path)
            .arg("-")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ParseError::Extraction(format!(
                        "{} not found; install poppler-utils to read PDF files",
                        self.config.pdftotext_binary
                    ))
                } else {
                    ParseError::Extraction(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(ParseError::Unreadable(format!(
                "{}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).replace('\u{000C}', "\n");
        Ok(text.trim().to_string())
    }

    /// 元数据读取失败只记录日志
    async fn read_metadata(&self, path: &Path) -> PdfMetadata {
        match Command::new(&self.config.pdfinfo_binary)
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                PdfMetadata::parse(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::debug!(
                    path = %path.display(),
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "pdfinfo failed, using file name as title"
                );
                PdfMetadata::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "pdfinfo unavailable, using file name as title");
                PdfMetadata::default()
            }
        }
    }
}

#[async_trait]
impl DocumentParserPort for PdfDocumentParser {
    async fn parse(&self, path: &Path) -> Result<Document, ParseError> {
        if !path.exists() {
            return Err(ParseError::NotFound(path.display().to_string()));
        }

        let raw_text = self.extract_text(path).await?;
        let metadata = self.read_metadata(path).await;

        let title = metadata
            .title
            .and_then(|t| Title::new(t).ok())
            .unwrap_or_else(|| Title::from_path(path));

        tracing::debug!(
            path = %path.display(),
            title = %title,
            chars = raw_text.len(),
            "Extracted PDF text"
        );

        Ok(Document::new(title, metadata.author, path, raw_text))
    }

    fn supports(&self, path: &Path) -> bool {
        extension_of(path).as_deref() == Some("pdf")
    }
}
