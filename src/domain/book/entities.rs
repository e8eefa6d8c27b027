//! Book Context - Entities

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 章节 - 最小合成单位
///
/// 不变量:
/// - number 从 1 开始，按文档顺序连续分配
/// - audio_path 仅在该章节合成成功后设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// 章节编号（从 1 开始）
    number: usize,
    /// 章节标题
    title: String,
    /// 章节正文
    text: String,
    /// 生成的音频文件路径
    audio_path: Option<PathBuf>,
    /// 音频时长（秒）
    duration_secs: Option<f64>,
}

impl Chapter {
    pub fn new(number: usize, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            text: text.into(),
            audio_path: None,
            duration_secs: None,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn audio_path(&self) -> Option<&Path> {
        self.audio_path.as_deref()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn has_audio(&self) -> bool {
        self.audio_path.is_some()
    }

    /// 记录合成结果
    pub fn attach_audio(&mut self, path: PathBuf, duration_secs: Option<f64>) {
        self.audio_path = Some(path);
        self.duration_secs = duration_secs;
    }
}

impl std::fmt::Display for Chapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Chapter({} : {})", self.number, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_audio() {
        let mut chapter = Chapter::new(3, "Chapter 3", "Text");
        assert!(!chapter.has_audio());

        chapter.attach_audio(PathBuf::from("/out/chapter_03.wav"), Some(1.5));
        assert!(chapter.has_audio());
        assert_eq!(chapter.audio_path(), Some(Path::new("/out/chapter_03.wav")));
        assert_eq!(chapter.duration_secs(), Some(1.5));
        assert_eq!(chapter.to_string(), "Chapter(3 : Chapter 3)");
    }
}
