//! 章节切分器
//!
//! 按章节标题模式把原始文本切分为有序章节序列：
//! - 模式大小写不敏感，`^` / `$` 锚定到行首/行尾
//! - 从左到右查找所有不重叠的匹配
//! - 第一个匹配之前的内容（如前言）被丢弃
//! - 没有任何匹配时整本书作为一个章节

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use super::book::{Chapter, Document};

/// 默认章节标题模式
pub const DEFAULT_CHAPTER_PATTERN: &str = r"^(Chapter|CHAPTER)\s+\d+";

/// 未检测到章节时使用的标题
pub const FULL_BOOK_TITLE: &str = "Full book";

/// 章节切分错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("Book has no text to split")]
    NoContent,

    #[error("Invalid chapter pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// 章节切分器
///
/// 纯函数式：相同的 (文本, 模式) 总是得到相同的章节序列
#[derive(Debug, Clone)]
pub struct ChapterSplitter {
    pattern: Regex,
}

impl ChapterSplitter {
    /// 编译章节模式
    pub fn new(pattern: &str) -> Result<Self, SplitError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map_err(|e| SplitError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { pattern: regex })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// 切分文本
    ///
    /// 第 i 个匹配生成编号 i+1 的章节，标题为去除空白后的匹配文本，
    /// 正文为该匹配结束到下一个匹配开始（或文本末尾）之间的内容
    pub fn split(&self, raw_text: &str) -> Result<Vec<Chapter>, SplitError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(SplitError::NoContent);
        }

        let matches: Vec<_> = self.pattern.find_iter(text).collect();

        if matches.is_empty() {
            return Ok(vec![Chapter::new(1, FULL_BOOK_TITLE, text)]);
        }

        let chapters = matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let body_end = matches.get(i + 1).map_or(text.len(), |next| next.start());
                Chapter::new(i + 1, m.as_str().trim(), text[m.end()..body_end].trim())
            })
            .collect();

        Ok(chapters)
    }

    /// 切分文档并写回章节，返回章节数
    pub fn split_document(&self, document: &mut Document) -> Result<usize, SplitError> {
        let chapters = self.split(document.raw_text())?;
        let count = chapters.len();
        document.set_chapters(chapters);
        Ok(count)
    }
}
