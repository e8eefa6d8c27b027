//! Book Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::BookError;

/// 书名
///
/// 不变量: 去除首尾空白后非空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title(String);

impl Title {
    pub fn new(title: impl Into<String>) -> Result<Self, BookError> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(BookError::InvalidTitle("标题不能为空".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 从文件名推导标题
    ///
    /// `my_great-book.pdf` -> `My Great Book`，文件名为空时回退为 `Untitled`
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let words: Vec<String> = stem
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect();

        Self::new(words.join(" ")).unwrap_or_else(|_| Self("Untitled".to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_rejects_blank() {
        assert!(Title::new("   ").is_err());
        assert_eq!(Title::new("  Moby Dick ").unwrap().as_str(), "Moby Dick");
    }

    #[test]
    fn test_title_from_path() {
        let title = Title::from_path(Path::new("/books/the_old-MAN and_the_sea.pdf"));
        assert_eq!(title.as_str(), "The Old Man And The Sea");
    }

    #[test]
    fn test_title_from_path_fallback() {
        let title = Title::from_path(Path::new("/books/___.txt"));
        assert_eq!(title.as_str(), "Untitled");
    }
}
