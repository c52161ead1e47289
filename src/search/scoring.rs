//! Relevance scoring for matched comments

use comment_core::CommentRecord;

/// Points per keyword occurrence
pub const OCCURRENCE_POINTS: u64 = 10;

/// Bonus when a keyword appears near the start of the comment
pub const EARLY_MENTION_POINTS: u64 = 5;

/// Length of the "near the start" window, in characters
pub const EARLY_MENTION_WINDOW: usize = 50;

/// Likes beyond this add nothing
pub const LIKE_POINTS_CAP: u64 = 50;

pub const UPLOADER_POINTS: u64 = 20;
pub const VERIFIED_POINTS: u64 = 10;

/// Heuristic relevance of a comment for a keyword set.
///
/// Non-overlapping keyword occurrences, an early-mention bonus, capped likes
/// and author badges. Comparison uses a lower-cased copy of the text unless
/// `case_sensitive` is set; the record itself is never touched.
pub fn relevance_score<S: AsRef<str>>(
    comment: &CommentRecord,
    keywords: &[S],
    case_sensitive: bool,
) -> u64 {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref())
        .filter(|k| !k.is_empty())
        .map(|k| if case_sensitive { k.to_string() } else { k.to_lowercase() })
        .collect();

    let text = if case_sensitive {
        comment.text().to_string()
    } else {
        comment.text().to_lowercase()
    };

    let mut score = 0u64;

    for keyword in &keywords {
        score += OCCURRENCE_POINTS * text.matches(keyword.as_str()).count() as u64;
    }

    let opening: String = text.chars().take(EARLY_MENTION_WINDOW).collect();
    if keywords.iter().any(|k| opening.contains(k.as_str())) {
        score += EARLY_MENTION_POINTS;
    }

    score += comment.like_count().min(LIKE_POINTS_CAP);

    if comment.is_uploader() {
        score += UPLOADER_POINTS;
    }
    if comment.is_verified() {
        score += VERIFIED_POINTS;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> CommentRecord {
        CommentRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_phrase_scenario() {
        let comment = record(json!({
            "text": "I love this deep web documentary",
            "like_count": 5,
            "author": "Alice"
        }));

        assert_eq!(relevance_score(&comment, &["deep web"], false), 20);
    }

    #[test]
    fn test_occurrences_are_non_overlapping() {
        let comment = record(json!({"text": "aaaa"}));
        // "aa" occurs twice without overlap, plus the early mention bonus
        assert_eq!(relevance_score(&comment, &["aa"], false), 25);
    }

    #[test]
    fn test_case_folding() {
        let comment = record(json!({"text": "Murder MURDER murder"}));

        assert_eq!(relevance_score(&comment, &["murder"], false), 35);
        assert_eq!(relevance_score(&comment, &["murder"], true), 15);
    }

    #[test]
    fn test_early_mention_window() {
        let late = format!("{}keyword", "x".repeat(50));
        let early = format!("{}keyword", "x".repeat(43));

        assert_eq!(relevance_score(&record(json!({"text": late})), &["keyword"], false), 10);
        assert_eq!(relevance_score(&record(json!({"text": early})), &["keyword"], false), 15);
    }

    #[test]
    fn test_like_bonus_is_capped() {
        let base = relevance_score(&record(json!({"text": "zzz", "like_count": 0})), &["q"], false);
        let ten = relevance_score(&record(json!({"text": "zzz", "like_count": 10})), &["q"], false);
        let fifty = relevance_score(&record(json!({"text": "zzz", "like_count": 50})), &["q"], false);
        let many = relevance_score(&record(json!({"text": "zzz", "like_count": 5000})), &["q"], false);

        assert_eq!(ten - base, 10);
        assert_eq!(fifty - base, 50);
        assert_eq!(many, fifty);
    }

    #[test]
    fn test_badges() {
        let comment = record(json!({
            "text": "nothing relevant",
            "author_is_uploader": true,
            "author_is_verified": true
        }));

        assert_eq!(relevance_score(&comment, &["absent"], false), 30);
    }

    #[test]
    fn test_empty_keywords_contribute_nothing() {
        let comment = record(json!({"text": "some text", "like_count": 2}));
        assert_eq!(relevance_score(&comment, &[""], false), 2);
    }
}
