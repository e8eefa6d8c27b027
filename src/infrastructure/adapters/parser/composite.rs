//! Composite Parser - 按扩展名分派到具体解析器

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::{PdfDocumentParser, TextDocumentParser};
use crate::application::ports::{DocumentParserPort, ParseError};
use crate::domain::book::Document;

/// 组合解析器
pub struct CompositeDocumentParser {
    parsers: Vec<Arc<dyn DocumentParserPort>>,
}

impl CompositeDocumentParser {
    pub fn new(parsers: Vec<Arc<dyn DocumentParserPort>>) -> Self {
        Self { parsers }
    }

    /// 文本 + PDF
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Arc::new(TextDocumentParser::new()),
            Arc::new(PdfDocumentParser::default()),
        ])
    }

    fn find(&self, path: &Path) -> Option<&Arc<dyn DocumentParserPort>> {
        self.parsers.iter().find(|parser| parser.supports(path))
    }
}

#[async_trait]
impl DocumentParserPort for CompositeDocumentParser {
    async fn parse(&self, path: &Path) -> Result<Document, ParseError> {
        if !path.exists() {
            return Err(ParseError::NotFound(path.display().to_string()));
        }

        let parser = self.find(path).ok_or_else(|| {
            ParseError::UnsupportedFormat(
                path.extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_else(|| path.display().to_string()),
            )
        })?;

        parser.parse(path).await
    }

    fn supports(&self, path: &Path) -> bool {
        self.find(path).is_some()
    }
}
