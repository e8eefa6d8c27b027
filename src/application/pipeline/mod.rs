//! 有声书流水线
//!
//! Parse -> Split -> Synthesize 三阶段状态机：
//! - controller: 阶段编排与致命/警告路由
//! - synthesis: 逐章合成与失败隔离
//! - state: 流水线状态与错误分级
//! - layout: 输出目录布局

mod controller;
mod layout;
mod state;
mod synthesis;

pub use controller::AudiobookPipeline;
pub use layout::OutputLayout;
pub use state::{ErrorReport, PipelineConfig, PipelineOutcome, PipelineStage, PipelineState, Severity};
pub use synthesis::{SynthesisIsolator, SynthesisReport};
