//! Manifest Storage - 输出目录下的 manifest.json 与文件汇总

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::application::pipeline::{ErrorReport, Severity};
use crate::application::ports::AudioFormat;
use crate::domain::book::Document;

/// Manifest 存储错误
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 章节条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterEntry {
    pub number: usize,
    pub title: String,
    /// 相对输出根目录的路径
    pub file: PathBuf,
    pub duration_secs: Option<f64>,
}

/// 有声书清单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookManifest {
    pub title: String,
    pub author: Option<String>,
    pub source: PathBuf,
    pub format: AudioFormat,
    pub status: Severity,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub message: String,
    pub total_duration_secs: f64,
    pub chapters: Vec<ChapterEntry>,
    pub generated_at: DateTime<Utc>,
}

impl BookManifest {
    /// 由运行结果构建清单，只收录已生成音频的章节
    pub fn from_document(
        document: &Document,
        root: &Path,
        format: AudioFormat,
        report: &ErrorReport,
    ) -> Self {
        let chapters = document
            .chapters()
            .iter()
            .filter_map(|chapter| {
                let audio = chapter.audio_path()?;
                Some(ChapterEntry {
                    number: chapter.number(),
                    title: chapter.title().to_string(),
                    file: audio.strip_prefix(root).unwrap_or(audio).to_path_buf(),
                    duration_secs: chapter.duration_secs(),
                })
            })
            .collect();

        Self {
            title: document.title().to_string(),
            author: document.author().map(String::from),
            source: document.source_path().to_path_buf(),
            format,
            status: report.kind,
            message: report.message.clone(),
            total_duration_secs: document.total_duration_secs(),
            chapters,
            generated_at: Utc::now(),
        }
    }
}

/// 写出 manifest.json
pub async fn write_manifest(path: &Path, manifest: &BookManifest) -> Result<(), ManifestError> {
    let json = serde_json::to_vec_pretty(manifest)?;
    fs::write(path, json)
        .await
        .map_err(|e| ManifestError::IoError(e.to_string()))?;

    tracing::debug!(path = %path.display(), chapters = manifest.chapters.len(), "Manifest written");
    Ok(())
}

/// 读取 manifest.json
pub async fn read_manifest(path: &Path) -> Result<BookManifest, ManifestError> {
    let data = fs::read(path)
        .await
        .map_err(|e| ManifestError::IoError(e.to_string()))?;
    Ok(serde_json::from_slice(&data)?)
}

/// 已生成文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub size_bytes: u64,
}

impl GeneratedFile {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// 汇总本次运行生成的章节音频（按章节顺序）
///
/// 只读取文档中记录的音频路径，目录里的其他文件不计入
pub async fn generated_files(document: &Document) -> Vec<GeneratedFile> {
    let mut files = Vec::new();
    for path in document.chapters().iter().filter_map(|c| c.audio_path()) {
        match fs::metadata(path).await {
            Ok(metadata) => files.push(GeneratedFile {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                size_bytes: metadata.len(),
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Generated file is missing")
            }
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{Chapter, Title};
    use tempfile::tempdir;

    fn document(root: &Path) -> Document {
        let mut first = Chapter::new(1, "Chapter 1", "A");
        first.attach_audio(root.join("chapters/chapter_01.mp3"), Some(12.5));
        let second = Chapter::new(2, "Chapter 2", "B");
        let mut third = Chapter::new(3, "Chapter 3", "C");
        third.attach_audio(root.join("chapters/chapter_03.mp3"), None);

        let mut document = Document::new(
            Title::new("Moby Dick").unwrap(),
            Some("Herman Melville".to_string()),
            "/books/moby_dick.pdf",
            "raw",
        );
        document.set_chapters(vec![first, second, third]);
        document
    }

    #[test]
    fn test_manifest_lists_synthesized_chapters() {
        let root = Path::new("/out/moby");
        let manifest = BookManifest::from_document(
            &document(root),
            root,
            AudioFormat::Mp3,
            &ErrorReport::warning("1 chapters failed: [2]"),
        );

        assert_eq!(manifest.title, "Moby Dick");
        assert_eq!(manifest.status, Severity::Warning);
        assert_eq!(manifest.total_duration_secs, 12.5);
        let files: Vec<_> = manifest.chapters.iter().map(|c| c.file.clone()).collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("chapters/chapter_01.mp3"),
                PathBuf::from("chapters/chapter_03.mp3")
            ]
        );
    }

    #[tokio::test]
    async fn test_write_and_read_manifest() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("manifest.json");
        let manifest = BookManifest::from_document(
            &document(temp_dir.path()),
            temp_dir.path(),
            AudioFormat::Wav,
            &ErrorReport::none(),
        );

        write_manifest(&path, &manifest).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "none");
        assert_eq!(json["format"], "wav");
        assert!(json.get("message").is_none());
        assert_eq!(read_manifest(&path).await.unwrap(), manifest);
    }

    #[tokio::test]
    async fn test_generated_files_follow_document() {
        let temp_dir = tempdir().unwrap();
        let chapters = temp_dir.path().join("chapters");
        std::fs::create_dir_all(&chapters).unwrap();
        std::fs::write(chapters.join("chapter_01.mp3"), vec![0u8; 1024]).unwrap();
        std::fs::write(chapters.join("chapter_03.mp3"), vec![0u8; 2048]).unwrap();
        std::fs::write(chapters.join("chapter_02.mp3"), b"left from an earlier run").unwrap();
        std::fs::write(chapters.join("chapter_09.mp3"), b"unrelated").unwrap();

        let files = generated_files(&document(temp_dir.path())).await;

        assert_eq!(
            files,
            vec![
                GeneratedFile {
                    name: "chapter_01.mp3".to_string(),
                    size_bytes: 1024
                },
                GeneratedFile {
                    name: "chapter_03.mp3".to_string(),
                    size_bytes: 2048
                },
            ]
        );
        assert!((files[1].size_mb() - 2048.0 / 1048576.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_audio_is_skipped() {
        let temp_dir = tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("chapters")).unwrap();
        std::fs::write(temp_dir.path().join("chapters/chapter_03.mp3"), b"abc").unwrap();

        let files = generated_files(&document(temp_dir.path())).await;

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "chapter_03.mp3");
    }
}
