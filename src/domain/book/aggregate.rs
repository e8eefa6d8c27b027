//! Book Context - Aggregate Root

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Chapter, Title};

/// Document 聚合根
///
/// 不变量:
/// - 由文档解析器创建
/// - 章节只能由章节切分（填充）和合成隔离器（移除失败章节）修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    title: Title,
    author: Option<String>,
    source_path: PathBuf,
    raw_text: String,
    chapters: Vec<Chapter>,
}

impl Document {
    pub fn new(
        title: Title,
        author: Option<String>,
        source_path: impl Into<PathBuf>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            title,
            author: author.filter(|a| !a.trim().is_empty()),
            source_path: source_path.into(),
            raw_text: raw_text.into(),
            chapters: Vec::new(),
        }
    }

    /// 是否包含可用文本（非空白）
    pub fn has_text(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    pub fn set_chapters(&mut self, chapters: Vec<Chapter>) {
        self.chapters = chapters;
    }

    /// 取出全部章节（用于交给合成阶段处理后再放回）
    pub fn take_chapters(&mut self) -> Vec<Chapter> {
        std::mem::take(&mut self.chapters)
    }

    // Getters
    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter(&self, number: usize) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number() == number)
    }

    /// 所有已知时长之和（秒）
    pub fn total_duration_secs(&self) -> f64 {
        self.chapters.iter().filter_map(Chapter::duration_secs).sum()
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document('{}', {} chapters)", self.title, self.chapters.len())
    }
}
