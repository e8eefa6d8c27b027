//! Book Context - 书籍限界上下文
//!
//! 职责:
//! - 文档聚合（标题、作者、原始文本、章节）
//! - 章节实体（编号、标题、正文、音频引用）

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::Document;
pub use entities::Chapter;
pub use errors::BookError;
pub use value_objects::Title;
