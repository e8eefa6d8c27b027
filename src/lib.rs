//! Audiobook - 文档转有声书
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 文档、章节
//! - 章节切分器
//!
//! 应用层 (application/):
//! - Ports: 文档解析、语音引擎、音频转码/探测
//! - Pipeline: Parse -> Split -> Synthesize 状态机与错误分级
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: 文本/PDF 解析、HTTP/espeak/silent 语音引擎、ffmpeg 转码、symphonia 探测、manifest
//! - Logging: tracing 订阅器

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::pipeline::{AudiobookPipeline, ErrorReport, PipelineOutcome, Severity};
pub use config::{load_config, AppConfig};
