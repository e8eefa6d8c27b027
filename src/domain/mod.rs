//! Domain Layer - 领域层
//!
//! - Book Context: 文档与章节
//! - 章节切分器: 按标题模式切分原始文本

pub mod book;

mod chapter_splitter;

pub use chapter_splitter::{
    ChapterSplitter, SplitError, DEFAULT_CHAPTER_PATTERN, FULL_BOOK_TITLE,
};
