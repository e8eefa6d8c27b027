//! 输出目录布局
//!
//! `<output>/chapters/chapter_<NN>.<format>`，`<output>/manifest.json`

use std::path::{Path, PathBuf};

use crate::application::ports::AudioFormat;

const CHAPTERS_DIR: &str = "chapters";
const MANIFEST_FILE: &str = "manifest.json";

/// 输出目录布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn chapters_dir(&self) -> PathBuf {
        self.root.join(CHAPTERS_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// 章节文件名只由编号和格式决定，不同章节不会冲突
    pub fn chapter_file_name(number: usize, format: AudioFormat) -> String {
        format!("chapter_{:02}.{}", number, format.extension())
    }

    pub fn chapter_path(&self, number: usize, format: AudioFormat) -> PathBuf {
        self.chapters_dir()
            .join(Self::chapter_file_name(number, format))
    }

    /// 创建章节目录（已存在时不报错）
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.chapters_dir()).await
    }
}
