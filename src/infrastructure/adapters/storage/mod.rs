//! Storage Adapters - 输出目录清单

mod manifest;

pub use manifest::{
    generated_files, read_manifest, write_manifest, BookManifest, ChapterEntry,
    GeneratedFile, ManifestError,
};
