//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio;
mod document_parser;
mod voice_provider;

pub use audio::{AudioError, AudioFormat, AudioInfo, AudioProbePort, AudioTranscoderPort};
pub use document_parser::{extension_of, DocumentParserPort, ParseError};
pub use voice_provider::{TtsError, VoiceProviderPort, VoiceSettings};
