//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（DocumentParser、VoiceProvider、AudioTranscoder、AudioProbe）
//! - pipeline: Parse -> Split -> Synthesize 状态机与失败隔离
//! - error: 应用层错误定义

pub mod error;
pub mod pipeline;
pub mod ports;

pub use error::PipelineError;

pub use pipeline::{
    AudiobookPipeline, ErrorReport, OutputLayout, PipelineConfig, PipelineOutcome, PipelineStage,
    PipelineState, Severity, SynthesisIsolator, SynthesisReport,
};

pub use ports::{
    AudioError, AudioFormat, AudioInfo, AudioProbePort, AudioTranscoderPort, DocumentParserPort,
    ParseError, TtsError, VoiceProviderPort, VoiceSettings,
};
