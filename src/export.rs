//! JSON exports of result sets and author rankings

use crate::authors::AuthorStats;
use crate::search::SearchResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One exported match, carrying the original comment object verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedResult {
    pub video_id: String,
    pub source_file: String,
    pub relevance_score: u64,
    pub matched_text: Vec<String>,
    pub comment: Value,
}

impl From<&SearchResult<'_>> for ExportedResult {
    fn from(result: &SearchResult<'_>) -> Self {
        Self {
            video_id: result.video_id.to_string(),
            source_file: result.source_file.to_string(),
            relevance_score: result.relevance_score,
            matched_text: result.matched_text.iter().cloned().collect(),
            comment: result.comment.raw().clone(),
        }
    }
}

/// Search or user-extraction export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchExport {
    /// Command line that produced the results
    pub command: String,
    pub generated: String,
    pub total_results: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_filter: Option<String>,

    pub results: Vec<ExportedResult>,
}

impl SearchExport {
    pub fn new(command: &str, results: &[SearchResult<'_>], user_filter: Option<&str>) -> Self {
        Self::generated_at(command, results, user_filter, &Local::now())
    }

    pub fn generated_at<Tz: TimeZone>(
        command: &str,
        results: &[SearchResult<'_>],
        user_filter: Option<&str>,
        generated: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            command: command.to_string(),
            generated: generated.format(GENERATED_FORMAT).to_string(),
            total_results: results.len(),
            user_filter: user_filter.map(str::to_string),
            results: results.iter().map(ExportedResult::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedUser {
    pub rank: usize,
    pub author: String,
    pub author_id: String,
    pub comment_count: usize,
    pub total_likes: u64,
    pub avg_likes: f64,
    pub is_verified: bool,
    pub is_uploader: bool,
}

/// Most-active-authors export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUsersExport {
    pub command: String,
    pub generated: String,
    pub total_users: usize,
    pub users: Vec<ExportedUser>,
}

impl ActiveUsersExport {
    pub fn new(command: &str, top: &[&AuthorStats<'_>]) -> Self {
        let users: Vec<ExportedUser> = top
            .iter()
            .enumerate()
            .map(|(i, stats)| ExportedUser {
                rank: i + 1,
                author: stats.author.to_string(),
                author_id: stats.author_id.to_string(),
                comment_count: stats.comment_count(),
                total_likes: stats.total_likes,
                avg_likes: stats.average_likes(),
                is_verified: stats.is_verified,
                is_uploader: stats.is_uploader,
            })
            .collect();

        Self {
            command: command.to_string(),
            generated: Local::now().format(GENERATED_FORMAT).to_string(),
            total_users: users.len(),
            users,
        }
    }
}

/// Write `value` as pretty JSON, creating parent directories
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("✓ Results exported to JSON: {}", path.display());
    Ok(())
}

/// Export a result list unless it is empty; returns the written path
pub fn save_results(
    path: &Path,
    command: &str,
    results: &[SearchResult<'_>],
    user_filter: Option<&str>,
) -> Result<Option<PathBuf>> {
    if results.is_empty() {
        debug!("Nothing to export for {}", path.display());
        return Ok(None);
    }

    write_json(path, &SearchExport::new(command, results, user_filter))?;
    Ok(Some(path.to_path_buf()))
}

pub fn read_search_export(path: &Path) -> Result<SearchExport> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Keep alphanumerics, space, `-` and `_`, trim, then turn spaces into `_`
pub fn safe_filename_component(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Last path component of the search directory, used to label exports
pub fn directory_label(dir: &Path) -> String {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .unwrap_or_else(|_| dir.to_path_buf())
    };

    absolute
        .components()
        .rev()
        .find_map(|c| match c {
            std::path::Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .unwrap_or_else(|| "comments".to_string())
}

/// Export file names under a results directory, all sharing one timestamp
#[derive(Debug, Clone)]
pub struct ExportNaming {
    results_dir: PathBuf,
    dir_label: String,
    timestamp: String,
}

impl ExportNaming {
    pub fn new(results_dir: impl Into<PathBuf>, search_dir: &Path) -> Self {
        Self::at(results_dir, search_dir, &Local::now())
    }

    pub fn at<Tz: TimeZone>(
        results_dir: impl Into<PathBuf>,
        search_dir: &Path,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            results_dir: results_dir.into(),
            dir_label: directory_label(search_dir),
            timestamp: now.format(FILE_TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// `{dir}_{ts}.json`
    pub fn search(&self) -> PathBuf {
        self.file(&format!("{}_{}", self.dir_label, self.timestamp))
    }

    /// `user_{name}_{ts}.json`
    pub fn user(&self, username: &str) -> PathBuf {
        self.file(&format!(
            "user_{}_{}",
            safe_filename_component(username),
            self.timestamp
        ))
    }

    /// `{dir}_most_active_top{N}_{ts}.json`
    pub fn most_active(&self, top: usize) -> PathBuf {
        self.file(&format!(
            "{}_most_active_top{}_{}",
            self.dir_label, top, self.timestamp
        ))
    }

    /// `{dir}_most_active_{name}_{ts}.json`, used for a single author with keywords
    pub fn most_active_user(&self, username: &str) -> PathBuf {
        self.file(&format!(
            "{}_most_active_{}_{}",
            self.dir_label,
            safe_filename_component(username),
            self.timestamp
        ))
    }

    fn file(&self, stem: &str) -> PathBuf {
        self.results_dir.join(format!("{}.json", stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comment_core::CommentRecord;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_safe_filename_component() {
        assert_eq!(safe_filename_component("@John Doe!"), "John_Doe");
        assert_eq!(safe_filename_component("  a-b_c  "), "a-b_c");
        assert_eq!(safe_filename_component("../../etc"), "etc");
    }

    #[test]
    fn test_export_naming() {
        let naming = ExportNaming::at("search_results", Path::new("/data/case_comments"), &fixed_time());

        assert_eq!(
            naming.search(),
            PathBuf::from("search_results/case_comments_20240309_140507.json")
        );
        assert_eq!(
            naming.user("@Some User"),
            PathBuf::from("search_results/user_Some_User_20240309_140507.json")
        );
        assert_eq!(
            naming.most_active(5),
            PathBuf::from("search_results/case_comments_most_active_top5_20240309_140507.json")
        );
        assert_eq!(
            naming.most_active_user("Bob"),
            PathBuf::from("search_results/case_comments_most_active_Bob_20240309_140507.json")
        );
    }

    #[test]
    fn test_save_results_skips_empty_result_list() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("out/none.json");

        assert_eq!(save_results(&path, "comment-search zzz", &[], None).unwrap(), None);
        assert!(!path.exists());
        assert!(!temp_dir.path().join("out").exists());

        let comment = CommentRecord::from_value(json!({"text": "found it"})).unwrap();
        let results = vec![SearchResult::unscored(&comment, "abc.info.json", "abc")];
        let written = save_results(&path, "comment-search --user x", &results, Some("x")).unwrap();

        assert_eq!(written, Some(path.clone()));
        let loaded = read_search_export(&path).unwrap();
        assert_eq!(loaded.total_results, 1);
        assert_eq!(loaded.user_filter.as_deref(), Some("x"));
    }

    #[test]
    fn test_directory_label_ignores_trailing_dot() {
        assert_eq!(directory_label(Path::new("/data/comments/.")), "comments");
    }

    #[test]
    fn test_search_export_shape() {
        let comment = CommentRecord::from_value(json!({
            "text": "deep web",
            "author": "Alice",
            "extra_field": [1, 2]
        }))
        .unwrap();
        let results = vec![SearchResult {
            comment: &comment,
            source_file: "abc.info.json",
            video_id: "abc",
            relevance_score: 20,
            matched_text: BTreeSet::from(["deep web".to_string()]),
            highlight_ranges: vec![0..8],
        }];

        let export = SearchExport::generated_at("comment-search deep", &results, None, &fixed_time());
        let value = serde_json::to_value(&export).unwrap();

        assert_eq!(value["generated"], "2024-03-09 14:05:07");
        assert_eq!(value["total_results"], 1);
        assert!(value.get("user_filter").is_none());
        assert_eq!(value["results"][0]["matched_text"], json!(["deep web"]));
        assert_eq!(value["results"][0]["comment"]["extra_field"], json!([1, 2]));

        let with_user = SearchExport::generated_at("cmd", &results, Some("Alice"), &fixed_time());
        assert_eq!(serde_json::to_value(&with_user).unwrap()["user_filter"], "Alice");
    }

    #[test]
    fn test_write_json_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/export.json");

        let export = SearchExport::generated_at("cmd", &[], None, &fixed_time());
        write_json(&path, &export).unwrap();

        assert_eq!(read_search_export(&path).unwrap(), export);
    }
}
