//! Result ordering and truncation

use crate::search::SearchResult;
use crate::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result ordering; every order is descending and stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Highest relevance score first
    #[default]
    Relevance,

    /// Most liked first
    Likes,

    /// Newest first; unknown post times sort as oldest
    Date,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Likes => "likes",
            SortKey::Date => "date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "likes" => Ok(SortKey::Likes),
            "date" => Ok(SortKey::Date),
            other => Err(SearchError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Sort results in place; equal keys keep scan order
pub fn sort_results(results: &mut [SearchResult<'_>], key: SortKey) {
    match key {
        SortKey::Relevance => results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score)),
        SortKey::Likes => {
            results.sort_by(|a, b| b.comment.like_count().cmp(&a.comment.like_count()))
        }
        SortKey::Date => results.sort_by(|a, b| date_key(b).cmp(&date_key(a))),
    }
}

/// Timestamp for date ordering; a missing (0) timestamp sorts as the oldest
fn date_key(result: &SearchResult<'_>) -> i64 {
    match result.comment.timestamp() {
        0 => i64::MIN,
        timestamp => timestamp,
    }
}

/// Keep the first `limit` items; `None` keeps everything
pub fn apply_limit<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comment_core::CommentRecord;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn comments() -> Vec<CommentRecord> {
        vec![
            json!({"text": "a", "like_count": 3, "timestamp": 0}),
            json!({"text": "b", "like_count": 9, "timestamp": 1_600_000_000}),
            json!({"text": "c", "like_count": 3, "timestamp": 1_700_000_000}),
            json!({"text": "d", "like_count": 1, "timestamp": 1_500_000_000}),
        ]
        .into_iter()
        .map(|v| CommentRecord::from_value(v).unwrap())
        .collect()
    }

    fn wrap<'a>(comments: &'a [CommentRecord], scores: &[u64]) -> Vec<SearchResult<'a>> {
        comments
            .iter()
            .zip(scores)
            .map(|(comment, &score)| SearchResult {
                comment,
                source_file: "vid.comments.json",
                video_id: "vid",
                relevance_score: score,
                matched_text: BTreeSet::new(),
                highlight_ranges: Vec::new(),
            })
            .collect()
    }

    fn texts(results: &[SearchResult<'_>]) -> Vec<String> {
        results.iter().map(|r| r.comment.text().to_string()).collect()
    }

    #[test]
    fn test_sort_by_relevance_is_stable() {
        let comments = comments();
        let mut results = wrap(&comments, &[10, 20, 10, 20]);

        sort_results(&mut results, SortKey::Relevance);
        assert_eq!(texts(&results), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_by_likes_is_non_increasing_and_stable() {
        let comments = comments();
        let mut results = wrap(&comments, &[0, 0, 0, 0]);

        sort_results(&mut results, SortKey::Likes);
        assert_eq!(texts(&results), vec!["b", "a", "c", "d"]);

        let likes: Vec<u64> = results.iter().map(|r| r.comment.like_count()).collect();
        assert!(likes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_by_date_puts_unknown_last() {
        let comments = comments();
        let mut results = wrap(&comments, &[0, 0, 0, 0]);

        sort_results(&mut results, SortKey::Date);
        assert_eq!(texts(&results), vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn test_sort_by_date_puts_missing_below_negative() {
        let comments: Vec<CommentRecord> = [
            json!({"text": "missing", "timestamp": 0}),
            json!({"text": "pre-epoch", "timestamp": -86_400}),
            json!({"text": "recent", "timestamp": 1_700_000_000}),
        ]
        .into_iter()
        .map(|v| CommentRecord::from_value(v).unwrap())
        .collect();
        let mut results = wrap(&comments, &[0, 0, 0]);

        sort_results(&mut results, SortKey::Date);
        assert_eq!(texts(&results), vec!["recent", "pre-epoch", "missing"]);
    }

    #[test]
    fn test_apply_limit() {
        let mut items = vec![1, 2, 3];
        apply_limit(&mut items, None);
        assert_eq!(items.len(), 3);

        apply_limit(&mut items, Some(2));
        assert_eq!(items, vec![1, 2]);

        apply_limit(&mut items, Some(10));
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("Likes".parse::<SortKey>().unwrap(), SortKey::Likes);
        assert!("popularity".parse::<SortKey>().is_err());
    }
}
