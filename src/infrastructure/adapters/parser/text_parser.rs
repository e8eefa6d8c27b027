//! Text Parser - 纯文本 / Markdown 文档

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use crate::application::ports::{extension_of, DocumentParserPort, ParseError};
use crate::domain::book::{Document, Title};

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];

/// 纯文本解析器
///
/// 非 UTF-8 字节按替换字符处理，不视为错误
#[derive(Debug, Default, Clone)]
pub struct TextDocumentParser;

impl TextDocumentParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParserPort for TextDocumentParser {
    async fn parse(&self, path: &Path) -> Result<Document, ParseError> {
        let bytes = fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ParseError::NotFound(path.display().to_string()),
            _ => ParseError::Unreadable(format!("{}: {}", path.display(), e)),
        })?;

        let raw_text = String::from_utf8_lossy(&bytes).into_owned();

        tracing::debug!(
            path = %path.display(),
            bytes = bytes.len(),
            "Read text document"
        );

        Ok(Document::new(Title::from_path(path), None, path, raw_text))
    }

    fn supports(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_parse_text_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("the_old-man.txt");
        std::fs::write(&path, "Chapter 1\nThe sea.").unwrap();

        let document = TextDocumentParser::new().parse(&path).await.unwrap();

        assert_eq!(document.title().as_str(), "The Old Man");
        assert_eq!(document.author(), None);
        assert_eq!(document.raw_text(), "Chapter 1\nThe sea.");
        assert_eq!(document.source_path(), path.as_path());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("latin.txt");
        std::fs::write(&path, b"caf\xe9").unwrap();

        let document = TextDocumentParser::new().parse(&path).await.unwrap();
        assert_eq!(document.raw_text(), "caf\u{FFFD}");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = TextDocumentParser::new()
            .parse(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::NotFound(_)));
    }

    #[test]
    fn test_supports() {
        let parser = TextDocumentParser::new();
        assert!(parser.supports(Path::new("book.txt")));
        assert!(parser.supports(Path::new("README.MD")));
        assert!(!parser.supports(Path::new("book.pdf")));
        assert!(!parser.supports(Path::new("book")));
    }
}
