//! Per-author statistics and user-scoped extraction

use crate::ranking::{apply_limit, sort_results, SortKey};
use crate::search::matcher::KeywordMatcher;
use crate::search::{SearchQuery, SearchResult};
use crate::SearchError;
use comment_core::record::UNKNOWN_AUTHOR_ID;
use comment_core::{CommentRecord, Corpus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Maximum number of "did you mean" names offered for an unknown author
pub const MAX_SUGGESTIONS: usize = 5;

/// One comment attributed to an author, with where it came from
#[derive(Debug, Clone, Copy)]
pub struct AuthoredComment<'a> {
    pub comment: &'a CommentRecord,
    pub source_file: &'a str,
    pub video_id: &'a str,
}

/// Everything known about one author within a run
#[derive(Debug, Clone)]
pub struct AuthorStats<'a> {
    pub author: &'a str,

    /// First known id; `"N/A"` when the author never carried one
    pub author_id: &'a str,

    pub total_likes: u64,
    pub is_verified: bool,
    pub is_uploader: bool,

    /// Comments in scan order
    pub comments: Vec<AuthoredComment<'a>>,
}

impl<'a> AuthorStats<'a> {
    fn new(author: &'a str) -> Self {
        Self {
            author,
            author_id: UNKNOWN_AUTHOR_ID,
            total_likes: 0,
            is_verified: false,
            is_uploader: false,
            comments: Vec::new(),
        }
    }

    fn record(&mut self, entry: AuthoredComment<'a>) {
        let comment = entry.comment;

        if self.author_id == UNKNOWN_AUTHOR_ID && comment.author_id() != UNKNOWN_AUTHOR_ID {
            self.author_id = comment.author_id();
        }
        self.total_likes += comment.like_count();
        self.is_verified |= comment.is_verified();
        self.is_uploader |= comment.is_uploader();
        self.comments.push(entry);
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// 0 when the author has no comments
    pub fn average_likes(&self) -> f64 {
        if self.comments.is_empty() {
            0.0
        } else {
            self.total_likes as f64 / self.comments.len() as f64
        }
    }

    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            author: self.author.to_string(),
            author_id: self.author_id.to_string(),
            comment_count: self.comment_count(),
            total_likes: self.total_likes,
            average_likes: self.average_likes(),
            is_verified: self.is_verified,
            is_uploader: self.is_uploader,
        }
    }
}

/// Owned snapshot of [`AuthorStats`] without the comment list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub author: String,
    pub author_id: String,
    pub comment_count: usize,
    pub total_likes: u64,
    pub average_likes: f64,
    pub is_verified: bool,
    pub is_uploader: bool,
}

/// Comments grouped by exact author display name.
///
/// Authors keep first-encountered order so rankings break ties by scan order.
#[derive(Debug, Clone, Default)]
pub struct AuthorRollup<'a> {
    index: HashMap<&'a str, usize>,
    authors: Vec<AuthorStats<'a>>,
}

impl<'a> AuthorRollup<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every comment of the corpus, matching or not
    pub fn from_corpus(corpus: &'a Corpus) -> Self {
        let mut rollup = Self::new();
        for (file, comment) in corpus.comments() {
            rollup.record(AuthoredComment {
                comment,
                source_file: &file.source_file,
                video_id: &file.video_id,
            });
        }
        rollup
    }

    /// Only the comments of a result list
    pub fn from_results(results: &[SearchResult<'a>]) -> Self {
        let mut rollup = Self::new();
        for result in results {
            rollup.record(AuthoredComment {
                comment: result.comment,
                source_file: result.source_file,
                video_id: result.video_id,
            });
        }
        rollup
    }

    pub fn record(&mut self, entry: AuthoredComment<'a>) {
        let author = entry.comment.author();
        let slot = match self.index.get(author) {
            Some(&slot) => slot,
            None => {
                self.authors.push(AuthorStats::new(author));
                self.index.insert(author, self.authors.len() - 1);
                self.authors.len() - 1
            }
        };
        self.authors[slot].record(entry);
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn get(&self, author: &str) -> Option<&AuthorStats<'a>> {
        self.index.get(author).map(|&slot| &self.authors[slot])
    }

    /// Authors in first-encountered order
    pub fn authors(&self) -> &[AuthorStats<'a>] {
        &self.authors
    }

    /// Authors by comment count, most active first
    pub fn ranked(&self) -> Vec<&AuthorStats<'a>> {
        let mut ranked: Vec<&AuthorStats<'a>> = self.authors.iter().collect();
        ranked.sort_by(|a, b| b.comment_count().cmp(&a.comment_count()));
        ranked
    }

    pub fn top(&self, k: usize) -> Vec<&AuthorStats<'a>> {
        let mut ranked = self.ranked();
        ranked.truncate(k);
        ranked
    }

    /// Names containing `query` as a case-insensitive substring
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        self.authors
            .iter()
            .filter(|stats| stats.author.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .map(|stats| stats.author.to_string())
            .collect()
    }

    /// Comments of one author.
    ///
    /// With keywords the comments are filtered by the matcher and ordered by
    /// relevance; without keywords every comment is kept and ordered by likes.
    /// `min_likes` and `max_results` apply either way.
    pub fn extract_user_comments(&self, username: &str, query: &SearchQuery) -> UserExtraction<'a> {
        let Some(stats) = self.get(username) else {
            let suggestions = self.suggestions(username);
            debug!("No author named '{}', {} suggestion(s)", username, suggestions.len());
            return UserExtraction::empty(SearchError::UnknownAuthor {
                name: username.to_string(),
                suggestions,
            });
        };

        let matcher = match query.has_keywords().then(|| query.matcher()).transpose() {
            Ok(matcher) => matcher,
            Err(e) => {
                return UserExtraction {
                    summary: Some(stats.summary()),
                    issue: Some(e),
                    ..UserExtraction::default()
                }
            }
        };

        let mut extraction = UserExtraction {
            summary: Some(stats.summary()),
            results: filter_author(stats, query.min_likes, matcher.as_ref()),
            issue: matcher.as_ref().and_then(|m| m.regex_error().cloned()),
            ..UserExtraction::default()
        };

        if matcher.is_some() {
            info!(
                "✓ Found {} matching comments from {}",
                extraction.results.len(),
                username
            );
        } else if query.min_likes > 0 {
            info!(
                "✓ Filtered to {} comments with {}+ likes",
                extraction.results.len(),
                query.min_likes
            );
        }

        extraction.total_matches = extraction.results.len();
        apply_limit(&mut extraction.results, query.max_results);
        extraction
    }

    /// Keyword-filtered comments of the `k` most active authors, concatenated
    /// in author rank order, then capped by `max_results`.
    ///
    /// The keyword set is compiled once for all authors.
    pub fn most_active_comments(&self, k: usize, query: &SearchQuery) -> UserExtraction<'a> {
        let matcher = match query.has_keywords().then(|| query.matcher()).transpose() {
            Ok(matcher) => matcher,
            Err(e) => return UserExtraction::empty(e),
        };

        let mut combined = UserExtraction {
            issue: matcher.as_ref().and_then(|m| m.regex_error().cloned()),
            ..UserExtraction::default()
        };
        for stats in self.top(k) {
            combined
                .results
                .extend(filter_author(stats, query.min_likes, matcher.as_ref()));
        }

        combined.total_matches = combined.results.len();
        apply_limit(&mut combined.results, query.max_results);
        combined
    }
}

/// One author's comments at or above `min_likes`: matched and by relevance
/// with a matcher, unscored and by likes without one
fn filter_author<'a>(
    stats: &AuthorStats<'a>,
    min_likes: u64,
    matcher: Option<&KeywordMatcher>,
) -> Vec<SearchResult<'a>> {
    let eligible = stats
        .comments
        .iter()
        .filter(|entry| entry.comment.like_count() >= min_likes);

    match matcher {
        Some(matcher) => {
            let mut results: Vec<SearchResult<'a>> = eligible
                .filter(|entry| matcher.is_match(entry.comment.text()))
                .map(|entry| {
                    SearchResult::matched(entry.comment, entry.source_file, entry.video_id, matcher)
                })
                .collect();
            sort_results(&mut results, SortKey::Relevance);
            results
        }
        None => {
            let mut results: Vec<SearchResult<'a>> = eligible
                .map(|entry| SearchResult::unscored(entry.comment, entry.source_file, entry.video_id))
                .collect();
            sort_results(&mut results, SortKey::Likes);
            results
        }
    }
}

/// Result of a user-scoped query
#[derive(Debug, Clone, Default)]
pub struct UserExtraction<'a> {
    /// `None` when the author is unknown
    pub summary: Option<AuthorSummary>,

    pub results: Vec<SearchResult<'a>>,

    /// Matches before the result cap
    pub total_matches: usize,

    pub issue: Option<SearchError>,
}

impl<'a> UserExtraction<'a> {
    pub fn empty(issue: SearchError) -> Self {
        Self {
            issue: Some(issue),
            ..Self::default()
        }
    }

    /// "Did you mean" names when the author was not found
    pub fn suggestions(&self) -> &[String] {
        match &self.issue {
            Some(SearchError::UnknownAuthor { suggestions, .. }) => suggestions,
            _ => &[],
        }
    }
}
