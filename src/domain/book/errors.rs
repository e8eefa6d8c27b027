//! Book Context - Errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("无效的标题: {0}")]
    InvalidTitle(String),
}
