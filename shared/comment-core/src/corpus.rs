//! Corpus discovery and loading

use crate::{extract_video_id, CommentCoreError, CommentRecord, Result};
use globset::{GlobBuilder, GlobMatcher};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Matches both `<id>.info.json` and `<id>.comments.json`
pub const DEFAULT_FILE_PATTERN: &str = "*.json";

/// Key holding the comment list in a "metadata + comments" wrapper object
const WRAPPED_COMMENTS_KEY: &str = "comments";

/// Comments read from a single corpus file
#[derive(Debug, Clone)]
pub struct LoadedFile {
    /// File name (without directory)
    pub source_file: String,

    /// Video id derived from the file name
    pub video_id: String,

    /// Parsed comments in file order
    pub comments: Vec<CommentRecord>,
}

/// Locates and parses the comment files of one search directory
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    /// Directory holding the comment files
    dir: PathBuf,

    /// Glob the file name has to match
    pattern: String,

    matcher: GlobMatcher,
}

impl CorpusLoader {
    /// Create a loader for `dir` selecting files whose name matches `pattern`
    pub fn new(dir: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|source| CommentCoreError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            dir: dir.into(),
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// Create a loader with [`DEFAULT_FILE_PATTERN`]
    pub fn with_default_pattern(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(dir, DEFAULT_FILE_PATTERN)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// List matching files, sorted by name
    pub fn matching_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(CommentCoreError::MissingDirectory(self.dir.clone()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            if self.matcher.is_match(entry.file_name()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Lazily load every matching file.
    ///
    /// Files that cannot be read or parsed are logged and skipped; their
    /// names are available from [`LoadedFiles::skipped`] afterwards.
    pub fn files(&self) -> Result<LoadedFiles> {
        Ok(LoadedFiles {
            paths: self.matching_files()?.into_iter(),
            skipped: Vec::new(),
        })
    }

    /// Load the whole corpus, telling a missing directory apart from an empty one
    pub fn scan(&self) -> CorpusScan {
        let mut files = match self.files() {
            Ok(files) => files,
            Err(CommentCoreError::MissingDirectory(dir)) => {
                warn!("Directory not found: {}", dir.display());
                return CorpusScan::MissingDirectory(dir);
            }
            Err(e) => {
                warn!("Failed to list {}: {}", self.dir.display(), e);
                return CorpusScan::MissingDirectory(self.dir.clone());
            }
        };

        if files.remaining() == 0 {
            warn!("No {} files found in {}", self.pattern, self.dir.display());
            return CorpusScan::NoMatchingFiles(self.dir.clone());
        }

        let loaded: Vec<LoadedFile> = files.by_ref().collect();
        let corpus = Corpus {
            files: loaded,
            skipped_files: files.into_skipped(),
        };

        debug!(
            "Loaded {} comments from {} file(s) in {}",
            corpus.total_comments(),
            corpus.file_count(),
            self.dir.display()
        );

        CorpusScan::Loaded(corpus)
    }

    /// Read and parse one comment file
    pub fn load_file(path: &Path) -> Result<LoadedFile> {
        let content = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&content)?;

        let source_file = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let comments = comment_values(document)
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match CommentRecord::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("Skipping comment #{} in {}: {}", index, source_file, e);
                    None
                }
            })
            .collect();

        Ok(LoadedFile {
            video_id: extract_video_id(&source_file),
            source_file,
            comments,
        })
    }
}

/// Pull the comment list out of a parsed document
fn comment_values(document: Value) -> Vec<Value> {
    match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(WRAPPED_COMMENTS_KEY) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Iterator returned by [`CorpusLoader::files`]
#[derive(Debug)]
pub struct LoadedFiles {
    paths: std::vec::IntoIter<PathBuf>,
    skipped: Vec<String>,
}

impl LoadedFiles {
    /// Files not yet visited
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }

    /// Names of files skipped so far
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<String> {
        self.skipped
    }
}

impl Iterator for LoadedFiles {
    type Item = LoadedFile;

    fn next(&mut self) -> Option<Self::Item> {
        for path in self.paths.by_ref() {
            match CorpusLoader::load_file(&path) {
                Ok(file) => return Some(file),
                Err(e) => {
                    warn!("Error loading {}: {}", path.display(), e);
                    self.skipped.push(
                        path.file_name()
                            .map(|name| name.to_string_lossy().to_string())
                            .unwrap_or_else(|| path.display().to_string()),
                    );
                }
            }
        }
        None
    }
}

/// Every file loaded for one run
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub files: Vec<LoadedFile>,

    /// Files that failed to load
    pub skipped_files: Vec<String>,
}

impl Corpus {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_comments(&self) -> usize {
        self.files.iter().map(|file| file.comments.len()).sum()
    }

    /// All comments in scan order, paired with their file
    pub fn comments(&self) -> impl Iterator<Item = (&LoadedFile, &CommentRecord)> {
        self.files
            .iter()
            .flat_map(|file| file.comments.iter().map(move |comment| (file, comment)))
    }
}

/// Outcome of scanning a search directory
#[derive(Debug, Clone)]
pub enum CorpusScan {
    MissingDirectory(PathBuf),
    NoMatchingFiles(PathBuf),
    Loaded(Corpus),
}

impl CorpusScan {
    pub fn into_corpus(self) -> Option<Corpus> {
        match self {
            CorpusScan::Loaded(corpus) => Some(corpus),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comment_values_from_array() {
        let values = comment_values(json!([{"text": "a"}, {"text": "b"}]));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_comment_values_from_wrapper() {
        let values = comment_values(json!({"id": "abc", "comments": [{"text": "a"}]}));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_comment_values_malformed_wrapper() {
        assert!(comment_values(json!({"id": "abc"})).is_empty());
        assert!(comment_values(json!({"comments": "nope"})).is_empty());
        assert!(comment_values(json!(42)).is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let result = CorpusLoader::new(".", "[unclosed");
        assert!(matches!(result, Err(CommentCoreError::Pattern { .. })));
    }
}
