//! Comment search over a loaded corpus
//!
//! Corpus → keyword matching → relevance scoring → sort / limit. Every step
//! is a pure function of the corpus and the query; records are borrowed and
//! never modified, annotations live on [`SearchResult`].

pub mod matcher;
pub mod scoring;

use crate::authors::{AuthorRollup, UserExtraction};
use crate::ranking::{apply_limit, sort_results, SortKey};
use crate::SearchError;
use comment_core::{CommentRecord, Corpus, CorpusLoader, CorpusScan};
use matcher::{KeywordMatcher, SearchMode};
use scoring::relevance_score;
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::{debug, info};

/// Parameters of one search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub mode: SearchMode,
    pub case_sensitive: bool,

    /// Comments with fewer likes are dropped before matching
    pub min_likes: u64,

    /// Result cap applied after sorting
    pub max_results: Option<usize>,

    pub sort_by: SortKey,
}

impl SearchQuery {
    pub fn new<S: Into<String>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_min_likes(mut self, min_likes: u64) -> Self {
        self.min_likes = min_likes;
        self
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn has_keywords(&self) -> bool {
        self.keywords.iter().any(|k| !k.trim().is_empty())
    }

    /// Compile the keyword set for this query
    pub fn matcher(&self) -> Result<KeywordMatcher, SearchError> {
        KeywordMatcher::new(&self.keywords, self.mode, self.case_sensitive)
    }
}

/// A matching comment and what was computed about it
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    pub comment: &'a CommentRecord,

    /// File the comment was loaded from
    pub source_file: &'a str,

    /// Video id derived from the file name
    pub video_id: &'a str,

    /// 0 when no keywords were involved
    pub relevance_score: u64,

    /// Literal matched text, deduplicated by content
    pub matched_text: BTreeSet<String>,

    /// Disjoint byte ranges of matches in the comment text
    pub highlight_ranges: Vec<Range<usize>>,
}

impl<'a> SearchResult<'a> {
    /// Wrap a comment without any match annotations
    pub fn unscored(comment: &'a CommentRecord, source_file: &'a str, video_id: &'a str) -> Self {
        Self {
            comment,
            source_file,
            video_id,
            relevance_score: 0,
            matched_text: BTreeSet::new(),
            highlight_ranges: Vec::new(),
        }
    }

    /// Wrap a comment that satisfied `matcher`
    pub fn matched(
        comment: &'a CommentRecord,
        source_file: &'a str,
        video_id: &'a str,
        matcher: &KeywordMatcher,
    ) -> Self {
        let text = comment.text();
        Self {
            comment,
            source_file,
            video_id,
            relevance_score: relevance_score(comment, matcher.keywords(), matcher.case_sensitive()),
            matched_text: matcher.matched_spans(text),
            highlight_ranges: matcher.match_ranges(text),
        }
    }
}

/// Results of a search plus the reason when there are none
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome<'a> {
    pub results: Vec<SearchResult<'a>>,

    /// Comments looked at
    pub scanned_comments: usize,

    /// Matches before the result cap
    pub total_matches: usize,

    pub issue: Option<SearchError>,
}

impl<'a> SearchOutcome<'a> {
    pub fn empty(issue: SearchError) -> Self {
        Self {
            issue: Some(issue),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Searches one corpus.
///
/// A searcher built from a failed scan stays usable: every operation returns
/// an empty result carrying the scan problem.
#[derive(Debug, Clone, Default)]
pub struct CommentSearcher {
    corpus: Corpus,
    corpus_issue: Option<SearchError>,
}

impl CommentSearcher {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            corpus_issue: None,
        }
    }

    /// Scan the loader's directory and wrap whatever was found
    pub fn load(loader: &CorpusLoader) -> Self {
        Self::from_scan(loader.scan())
    }

    pub fn from_scan(scan: CorpusScan) -> Self {
        match scan {
            CorpusScan::Loaded(corpus) => Self::new(corpus),
            CorpusScan::MissingDirectory(dir) => Self {
                corpus: Corpus::default(),
                corpus_issue: Some(SearchError::MissingDirectory(dir)),
            },
            CorpusScan::NoMatchingFiles(dir) => Self {
                corpus: Corpus::default(),
                corpus_issue: Some(SearchError::NoMatchingFiles(dir)),
            },
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Why the corpus is empty, if it failed to load
    pub fn corpus_issue(&self) -> Option<&SearchError> {
        self.corpus_issue.as_ref()
    }

    /// Keyword search across the whole corpus
    pub fn search(&self, query: &SearchQuery) -> SearchOutcome<'_> {
        if let Some(issue) = &self.corpus_issue {
            return SearchOutcome::empty(issue.clone());
        }

        let matcher = match query.matcher() {
            Ok(matcher) => matcher,
            Err(e) => return SearchOutcome::empty(e),
        };

        let mut results = Vec::new();
        let mut scanned_comments = 0;

        for (file, comment) in self.corpus.comments() {
            scanned_comments += 1;

            if !comment.has_text() || comment.like_count() < query.min_likes {
                continue;
            }

            if matcher.is_match(comment.text()) {
                results.push(SearchResult::matched(
                    comment,
                    &file.source_file,
                    &file.video_id,
                    &matcher,
                ));
            }
        }

        info!("✓ Scanned {} total comments", scanned_comments);
        info!("✓ Found {} matching comments", results.len());

        sort_results(&mut results, query.sort_by);
        let total_matches = results.len();
        apply_limit(&mut results, query.max_results);

        SearchOutcome {
            results,
            scanned_comments,
            total_matches,
            issue: matcher.regex_error().cloned(),
        }
    }

    /// Per-author statistics over every comment in the corpus
    pub fn author_rollup(&self) -> AuthorRollup<'_> {
        let rollup = AuthorRollup::from_corpus(&self.corpus);
        debug!("Found {} unique users", rollup.len());
        rollup
    }

    /// All comments of one author, optionally narrowed by the query's keywords
    pub fn extract_user_comments(&self, username: &str, query: &SearchQuery) -> UserExtraction<'_> {
        if let Some(issue) = &self.corpus_issue {
            return UserExtraction::empty(issue.clone());
        }

        self.author_rollup().extract_user_comments(username, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comment_core::LoadedFile;
    use serde_json::json;

    fn corpus() -> Corpus {
        let comments = vec![
            json!({"text": "I love this deep web documentary", "like_count": 5, "author": "Alice"}),
            json!({"text": "deep thoughts", "like_count": 1, "author": "Bob"}),
            json!({"text": "", "like_count": 100, "author": "Ghost"}),
            json!({"text": "nothing here", "like_count": 2, "author": "Bob"}),
        ]
        .into_iter()
        .map(|v| CommentRecord::from_value(v).unwrap())
        .collect();

        Corpus {
            files: vec![LoadedFile {
                source_file: "abc123.comments.json".to_string(),
                video_id: "abc123".to_string(),
                comments,
            }],
            skipped_files: Vec::new(),
        }
    }

    #[test]
    fn test_search_scores_and_sorts() {
        let searcher = CommentSearcher::new(corpus());
        let outcome = searcher.search(&SearchQuery::new(["deep"]));

        assert!(outcome.issue.is_none());
        assert_eq!(outcome.scanned_comments, 4);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].comment.author(), "Alice");
        assert_eq!(outcome.results[0].relevance_score, 20);
        assert_eq!(outcome.results[0].video_id, "abc123");
        assert_eq!(outcome.results[1].relevance_score, 16);
    }

    #[test]
    fn test_min_likes_filters_before_matching() {
        let searcher = CommentSearcher::new(corpus());
        let outcome = searcher.search(&SearchQuery::new(["deep"]).with_min_likes(2));

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].comment.author(), "Alice");
    }

    #[test]
    fn test_max_results_keeps_total() {
        let searcher = CommentSearcher::new(corpus());
        let outcome = searcher.search(&SearchQuery::new(["deep"]).with_max_results(Some(1)));

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.total_matches, 2);
    }

    #[test]
    fn test_no_keywords_is_explained() {
        let searcher = CommentSearcher::new(corpus());
        let outcome = searcher.search(&SearchQuery::new(Vec::<String>::new()));

        assert!(outcome.is_empty());
        assert_eq!(outcome.issue, Some(SearchError::NoKeywords));
    }

    #[test]
    fn test_invalid_regex_is_explained() {
        let searcher = CommentSearcher::new(corpus());
        let outcome = searcher.search(&SearchQuery::new(["deep("]).with_mode(SearchMode::Regex));

        assert!(outcome.is_empty());
        assert!(matches!(outcome.issue, Some(SearchError::InvalidRegex { .. })));
    }

    #[test]
    fn test_failed_scan_is_explained() {
        let searcher = CommentSearcher::from_scan(CorpusScan::MissingDirectory("nowhere".into()));

        let outcome = searcher.search(&SearchQuery::new(["deep"]));
        assert!(matches!(outcome.issue, Some(SearchError::MissingDirectory(_))));

        let extraction = searcher.extract_user_comments("Bob", &SearchQuery::default());
        assert!(extraction.results.is_empty());
        assert!(matches!(extraction.issue, Some(SearchError::MissingDirectory(_))));
    }
}
