//! Document Parser Adapters - 文档解析实现

mod composite;
mod pdf_parser;
mod text_parser;

pub use composite::CompositeDocumentParser;
pub use pdf_parser::{PdfDocumentParser, PdfMetadata, PdfParserConfig};
pub use text_parser::TextDocumentParser;
