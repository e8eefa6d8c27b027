//! Synthesis Isolator - 逐章合成与失败隔离
//!
//! 单个章节失败不会中断循环，也不会影响其他章节：
//! - 失败章节记录编号后继续
//! - 成功章节必须在目标路径留下非空文件
//! - 失败时清理目标路径上的残留文件

use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ErrorReport, OutputLayout};
use crate::application::error::PipelineError;
use crate::application::ports::{AudioFormat, AudioProbePort, TtsError, VoiceProviderPort};
use crate::domain::book::Chapter;

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisReport {
    /// 保留下来的章节（均带有音频）
    pub chapters: Vec<Chapter>,
    /// 失败的章节编号（升序）
    pub failed: Vec<usize>,
    pub error: ErrorReport,
}

/// 合成隔离器
pub struct SynthesisIsolator {
    provider: Arc<dyn VoiceProviderPort>,
    probe: Option<Arc<dyn AudioProbePort>>,
    max_concurrent: usize,
}

impl SynthesisIsolator {
    pub fn new(provider: Arc<dyn VoiceProviderPort>) -> Self {
        Self {
            provider,
            probe: None,
            max_concurrent: 1,
        }
    }

    /// 合成成功后读取音频时长
    pub fn with_probe(mut self, probe: Arc<dyn AudioProbePort>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// 最大并发合成数，至少为 1
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// 合成所有章节
    ///
    /// 不返回错误：结果总是 (保留章节, 分级, 消息)
    pub async fn synthesize(
        &self,
        mut chapters: Vec<Chapter>,
        layout: &OutputLayout,
        format: AudioFormat,
    ) -> SynthesisReport {
        let total = chapters.len();

        // 每个任务只借用自己的章节；汇总与完成顺序无关
        let outcomes: Vec<(usize, Result<(PathBuf, Option<f64>), TtsError>)> =
            stream::iter(chapters.iter().enumerate())
                .map(|(index, chapter)| {
                    let destination = layout.chapter_path(chapter.number(), format);
                    async move { (index, self.synthesize_chapter(chapter, destination).await) }
                })
                .buffer_unordered(self.max_concurrent)
                .collect()
                .await;

        let mut failed = Vec::new();
        for (index, outcome) in outcomes {
            let chapter = &mut chapters[index];
            match outcome {
                Ok((path, duration_secs)) => chapter.attach_audio(path, duration_secs),
                Err(e) => {
                    tracing::error!(
                        chapter = chapter.number(),
                        title = %chapter.title(),
                        error = %e,
                        "Chapter synthesis failed"
                    );
                    failed.push(chapter.number());
                }
            }
        }
        failed.sort_unstable();

        let succeeded = total - failed.len();
        let error = if succeeded == 0 {
            chapters.clear();
            PipelineError::AllChaptersFailed.into()
        } else if !failed.is_empty() {
            chapters.retain(Chapter::has_audio);
            ErrorReport::warning(format!("{} chapters failed: {:?}", failed.len(), failed))
        } else {
            ErrorReport::none()
        };

        tracing::info!(
            provider = %self.provider.name(),
            total = total,
            succeeded = succeeded,
            failed = failed.len(),
            "Synthesis finished"
        );

        SynthesisReport {
            chapters,
            failed,
            error,
        }
    }

    /// 合成单个章节
    ///
    /// 任何失败都会清理目标路径，避免上次运行的旧文件被当作本次结果
    async fn synthesize_chapter(
        &self,
        chapter: &Chapter,
        destination: PathBuf,
    ) -> Result<(PathBuf, Option<f64>), TtsError> {
        let path = match self.generate_artifact(chapter, &destination).await {
            Ok(path) => path,
            Err(e) => {
                remove_artifact(&destination).await;
                return Err(e);
            }
        };

        let duration_secs = self.probe_duration(chapter.number(), &path).await;

        tracing::info!(
            chapter = chapter.number(),
            path = %path.display(),
            duration_secs = ?duration_secs,
            "Chapter audio ready"
        );

        Ok((path, duration_secs))
    }

    /// 调用引擎并校验产物
    async fn generate_artifact(
        &self,
        chapter: &Chapter,
        destination: &Path,
    ) -> Result<PathBuf, TtsError> {
        if chapter.text().trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        tracing::info!(
            chapter = chapter.number(),
            title = %chapter.title(),
            destination = %destination.display(),
            "Generating audio"
        );

        let path = self.provider.generate(chapter.text(), destination).await?;

        if let Err(e) = validate_artifact(&path).await {
            if path != destination {
                remove_artifact(&path).await;
            }
            return Err(e);
        }

        Ok(path)
    }

    /// 时长探测失败不算合成失败
    ///
    /// 探测是阻塞 IO，放到 blocking 线程池执行
    async fn probe_duration(&self, number: usize, path: &Path) -> Option<f64> {
        let probe = self.probe.clone()?;
        let path = path.to_path_buf();

        let result = tokio::task::spawn_blocking(move || probe.probe(&path)).await;

        match result {
            Ok(Ok(info)) => Some(info.duration_secs()),
            Ok(Err(e)) => {
                tracing::warn!(chapter = number, error = %e, "Failed to probe audio duration");
                None
            }
            Err(e) => {
                tracing::warn!(chapter = number, error = %e, "Probe task failed");
                None
            }
        }
    }
}

/// 文件必须存在且非空
async fn validate_artifact(path: &Path) -> Result<u64, TtsError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        TtsError::InvalidArtifact(format!("{} is missing: {}", path.display(), e))
    })?;

    if !metadata.is_file() || metadata.len() == 0 {
        return Err(TtsError::InvalidArtifact(format!(
            "{} is empty",
            path.display()
        )));
    }

    Ok(metadata.len())
}

async fn remove_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial artifact"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove artifact"),
    }
}
