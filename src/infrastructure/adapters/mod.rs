//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod parser;
pub mod storage;
pub mod tts;

pub use audio::*;
pub use parser::*;
pub use storage::*;
pub use tts::*;
