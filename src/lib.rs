/// YouTube Comment Search
///
/// Keyword search, relevance ranking, author statistics and user profiling
/// over comment JSON files downloaded by the comment collector.

pub mod authors;
pub mod config;
pub mod export;
pub mod profile;
pub mod ranking;
pub mod render;
pub mod search;

use std::path::PathBuf;

// Re-export main types for easy access
pub use crate::authors::{AuthorRollup, AuthorStats, AuthorSummary, UserExtraction};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::export::{ActiveUsersExport, ExportNaming, SearchExport};
pub use crate::profile::{UserDatabase, UserProfile, UserSortKey};
pub use crate::ranking::SortKey;
pub use crate::render::RenderOptions;
pub use crate::search::matcher::{matched_spans, matches, KeywordMatcher, SearchMode};
pub use crate::search::scoring::relevance_score;
pub use crate::search::{CommentSearcher, SearchOutcome, SearchQuery, SearchResult};
pub use comment_core::{CommentRecord, Corpus, CorpusLoader, CorpusScan};

/// Problems with a query or its corpus.
///
/// Search operations never fail with these; they come back attached to an
/// empty (or partial) outcome so callers can explain why nothing matched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("No comment files found in {}", .0.display())]
    NoMatchingFiles(PathBuf),

    #[error("At least one non-empty keyword is required")]
    NoKeywords,

    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("User '{name}' not found in comments")]
    UnknownAuthor { name: String, suggestions: Vec<String> },

    #[error("Unknown search mode '{0}' (expected any, all, phrase or regex)")]
    UnknownMode(String),

    #[error("Unknown sort key '{0}' (expected relevance, likes or date)")]
    UnknownSortKey(String),
}
