//! Comment Core - Shared comment record model and corpus loading

pub mod corpus;
pub mod record;
pub mod video_id;

pub use corpus::{Corpus, CorpusLoader, CorpusScan, LoadedFile, LoadedFiles, DEFAULT_FILE_PATTERN};
pub use record::CommentRecord;
pub use video_id::extract_video_id;

use std::path::PathBuf;

/// Result type for Comment Core operations
pub type Result<T> = std::result::Result<T, CommentCoreError>;

/// Error types for Comment Core operations
#[derive(thiserror::Error, Debug)]
pub enum CommentCoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
