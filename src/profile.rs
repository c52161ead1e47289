//! Per-user activity profiles
//!
//! A [`UserDatabase`] groups the corpus by author and keeps which videos each
//! author commented on; [`UserProfile::analyze`] turns one entry into the
//! activity, engagement and vocabulary figures shown by `user-profiler`.

use crate::config::ProfileConfig;
use chrono::{DateTime, Timelike, Utc};
use comment_core::record::UNKNOWN_AUTHOR_ID;
use comment_core::{CommentRecord, Corpus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

const SECONDS_PER_DAY: f64 = 86_400.0;
const UNKNOWN_TIME: &str = "Unknown";

/// Ordering for the top-users listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UserSortKey {
    #[default]
    Comments,
    Videos,
    Likes,
}

impl UserSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserSortKey::Comments => "comments",
            UserSortKey::Videos => "videos",
            UserSortKey::Likes => "likes",
        }
    }
}

/// All comments of one author across the corpus
#[derive(Debug, Clone)]
pub struct UserRecord<'a> {
    pub author: &'a str,
    pub comments: Vec<&'a CommentRecord>,
    pub video_ids: BTreeSet<&'a str>,
    pub total_likes: u64,

    /// First id / channel url seen for the author
    pub author_id: Option<&'a str>,
    pub author_url: Option<&'a str>,

    pub is_verified: bool,
    pub is_uploader: bool,
}

impl<'a> UserRecord<'a> {
    fn new(author: &'a str) -> Self {
        Self {
            author,
            comments: Vec::new(),
            video_ids: BTreeSet::new(),
            total_likes: 0,
            author_id: None,
            author_url: None,
            is_verified: false,
            is_uploader: false,
        }
    }

    fn record(&mut self, comment: &'a CommentRecord, video_id: &'a str) {
        if self.author_id.is_none() && comment.author_id() != UNKNOWN_AUTHOR_ID {
            self.author_id = Some(comment.author_id());
        }
        if self.author_url.is_none() {
            self.author_url = comment.author_url().filter(|url| !url.is_empty());
        }

        self.total_likes += comment.like_count();
        self.is_verified |= comment.is_verified();
        self.is_uploader |= comment.is_uploader();
        self.video_ids.insert(video_id);
        self.comments.push(comment);
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn video_count(&self) -> usize {
        self.video_ids.len()
    }
}

/// Corpus grouped by author, in first-encountered order
#[derive(Debug, Clone, Default)]
pub struct UserDatabase<'a> {
    index: HashMap<&'a str, usize>,
    users: Vec<UserRecord<'a>>,
}

impl<'a> UserDatabase<'a> {
    pub fn build(corpus: &'a Corpus) -> Self {
        let mut db = Self::default();

        for (file, comment) in corpus.comments() {
            let author = comment.author();
            let slot = match db.index.get(author) {
                Some(&slot) => slot,
                None => {
                    db.users.push(UserRecord::new(author));
                    db.index.insert(author, db.users.len() - 1);
                    db.users.len() - 1
                }
            };
            db.users[slot].record(comment, &file.video_id);
        }

        db
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, author: &str) -> Option<&UserRecord<'a>> {
        self.index.get(author).map(|&slot| &self.users[slot])
    }

    pub fn users(&self) -> &[UserRecord<'a>] {
        &self.users
    }

    pub fn total_comments(&self) -> usize {
        self.users.iter().map(UserRecord::comment_count).sum()
    }

    /// Distinct video ids across all users
    pub fn video_count(&self) -> usize {
        self.users
            .iter()
            .flat_map(|user| user.video_ids.iter())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Up to `limit` users, ordered by `sort_by` descending; ties keep first-seen order
    pub fn top_users(&self, limit: usize, sort_by: UserSortKey) -> Vec<&UserRecord<'a>> {
        let mut ranked: Vec<&UserRecord<'a>> = self.users.iter().collect();
        match sort_by {
            UserSortKey::Comments => ranked.sort_by(|a, b| b.comment_count().cmp(&a.comment_count())),
            UserSortKey::Videos => ranked.sort_by(|a, b| b.video_count().cmp(&a.video_count())),
            UserSortKey::Likes => ranked.sort_by(|a, b| b.total_likes.cmp(&a.total_likes)),
        }
        ranked.truncate(limit);
        ranked
    }

    /// Users present on at least `min_videos` distinct videos, widest reach first
    pub fn cross_video_users(&self, min_videos: usize) -> Vec<&UserRecord<'a>> {
        let mut users: Vec<&UserRecord<'a>> = self
            .users
            .iter()
            .filter(|user| user.video_count() >= min_videos)
            .collect();
        users.sort_by(|a, b| b.video_count().cmp(&a.video_count()));
        users
    }

    /// Up to five names containing `query`, case-insensitively
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        self.users
            .iter()
            .filter(|user| user.author.to_lowercase().contains(&needle))
            .take(crate::authors::MAX_SUGGESTIONS)
            .map(|user| user.author.to_string())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Detailed analysis of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub author_id: Option<String>,
    pub author_url: Option<String>,
    pub is_verified: bool,
    pub is_uploader: bool,

    pub total_comments: usize,
    pub videos_participated: usize,
    pub total_likes: u64,
    pub avg_likes_per_comment: f64,

    pub total_words: usize,
    pub unique_words: usize,
    /// Characters of comment text per comment
    pub avg_comment_length: f64,
    pub top_keywords: Vec<KeywordCount>,

    /// UTC, `%Y-%m-%d %H:%M:%S`, or "Unknown"
    pub first_comment: String,
    pub last_comment: String,
    pub activity_span_days: f64,
    pub comments_per_day: f64,
    pub most_active_hour: String,

    pub root_comments: usize,
    pub reply_comments: usize,
    /// Percentage of replies
    pub reply_ratio: f64,
}

impl UserProfile {
    pub fn analyze(user: &UserRecord<'_>, config: &ProfileConfig) -> Self {
        let total_comments = user.comment_count();
        let per_comment = |value: f64| {
            if total_comments == 0 {
                0.0
            } else {
                value / total_comments as f64
            }
        };

        let words: Vec<String> = user
            .comments
            .iter()
            .flat_map(|comment| tokenize(comment.text()))
            .collect();
        let text_chars: usize = user.comments.iter().map(|c| c.text().chars().count()).sum();
        let unique_words = words.iter().collect::<HashSet<_>>().len();

        let reply_comments = user.comments.iter().filter(|c| c.is_reply()).count();
        let timeline = Timeline::from_comments(&user.comments);

        Self {
            username: user.author.to_string(),
            author_id: user.author_id.map(str::to_string),
            author_url: user.author_url.map(str::to_string),
            is_verified: user.is_verified,
            is_uploader: user.is_uploader,
            total_comments,
            videos_participated: user.video_count(),
            total_likes: user.total_likes,
            avg_likes_per_comment: per_comment(user.total_likes as f64),
            total_words: words.len(),
            unique_words,
            avg_comment_length: per_comment(text_chars as f64),
            top_keywords: top_keywords(&words, config),
            first_comment: timeline.first,
            last_comment: timeline.last,
            activity_span_days: timeline.span_days,
            comments_per_day: if timeline.known {
                if timeline.raw_span_days > 0.0 {
                    round_to(total_comments as f64 / timeline.raw_span_days, 2)
                } else {
                    total_comments as f64
                }
            } else {
                0.0
            },
            most_active_hour: timeline.most_active_hour,
            root_comments: total_comments - reply_comments,
            reply_comments,
            reply_ratio: round_to(per_comment(reply_comments as f64) * 100.0, 1),
        }
    }
}

/// Lower-cased word tokens (runs of alphanumerics and `_`)
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// Most frequent words outside the stop list; ties keep first occurrence
fn top_keywords(words: &[String], config: &ProfileConfig) -> Vec<KeywordCount> {
    let stop_words: HashSet<&str> = config.stop_words.iter().map(String::as_str).collect();

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in words {
        if word.chars().count() < config.min_word_length || stop_words.contains(word.as_str()) {
            continue;
        }
        let count = counts.entry(word.as_str()).or_insert(0);
        if *count == 0 {
            order.push(word.as_str());
        }
        *count += 1;
    }

    let mut ranked: Vec<KeywordCount> = order
        .into_iter()
        .map(|word| KeywordCount {
            word: word.to_string(),
            count: counts[word],
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(config.top_keywords);
    ranked
}

struct Timeline {
    known: bool,
    first: String,
    last: String,
    span_days: f64,
    raw_span_days: f64,
    most_active_hour: String,
}

impl Timeline {
    fn from_comments(comments: &[&CommentRecord]) -> Self {
        let mut times: Vec<DateTime<Utc>> = comments
            .iter()
            .map(|c| c.timestamp())
            .filter(|&ts| ts > 0)
            .filter_map(|ts| DateTime::from_timestamp(ts, 0))
            .collect();
        times.sort();

        let (Some(first), Some(last)) = (times.first(), times.last()) else {
            return Self {
                known: false,
                first: UNKNOWN_TIME.to_string(),
                last: UNKNOWN_TIME.to_string(),
                span_days: 0.0,
                raw_span_days: 0.0,
                most_active_hour: UNKNOWN_TIME.to_string(),
            };
        };

        let raw_span_days = (last.timestamp() - first.timestamp()) as f64 / SECONDS_PER_DAY;

        let mut hour_counts = [0usize; 24];
        let mut hour_order: Vec<u32> = Vec::new();
        for time in &times {
            let hour = time.hour();
            if hour_counts[hour as usize] == 0 {
                hour_order.push(hour);
            }
            hour_counts[hour as usize] += 1;
        }
        let busiest = hour_order
            .iter()
            .copied()
            .fold(None, |best: Option<u32>, hour| match best {
                Some(b) if hour_counts[b as usize] >= hour_counts[hour as usize] => Some(b),
                _ => Some(hour),
            })
            .unwrap_or(0);

        Self {
            known: true,
            first: format_utc(first),
            last: format_utc(last),
            span_days: round_to(raw_span_days, 1),
            raw_span_days,
            most_active_hour: format!("{:02}:00-{:02}:00", busiest, busiest + 1),
        }
    }
}

fn format_utc(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use comment_core::LoadedFile;
    use serde_json::{json, Value};

    fn file(video_id: &str, comments: Vec<Value>) -> LoadedFile {
        LoadedFile {
            source_file: format!("{}.info.json", video_id),
            video_id: video_id.to_string(),
            comments: comments
                .into_iter()
                .map(|v| CommentRecord::from_value(v).unwrap())
                .collect(),
        }
    }

    fn corpus() -> Corpus {
        Corpus {
            files: vec![
                file(
                    "vid1",
                    vec![
                        // 2023-11-14 22:13:20 UTC
                        json!({"text": "The suspect lied, the suspect ran", "author": "@Sleuth", "author_id": "UC1",
                               "like_count": 4, "timestamp": 1_700_000_000, "parent": "root"}),
                        json!({"text": "agreed", "author": "@Other", "like_count": 1, "timestamp": 1_700_000_000}),
                    ],
                ),
                file(
                    "vid2",
                    vec![
                        // one day and one hour later
                        json!({"text": "suspect again", "author": "@Sleuth", "like_count": 2,
                               "timestamp": 1_700_090_000, "parent": "abc",
                               "author_url": "https://www.youtube.com/@Sleuth"}),
                        json!({"text": "timeline?", "author": "@Other", "like_count": 9, "timestamp": 0}),
                    ],
                ),
                file("vid3", vec![json!({"text": "first", "author": "@Third"})]),
            ],
            skipped_files: Vec::new(),
        }
    }

    #[test]
    fn test_database_groups_by_author() {
        let corpus = corpus();
        let db = UserDatabase::build(&corpus);

        assert_eq!(db.len(), 3);
        assert_eq!(db.total_comments(), 5);
        assert_eq!(db.video_count(), 3);

        let sleuth = db.get("@Sleuth").unwrap();
        assert_eq!(sleuth.comment_count(), 2);
        assert_eq!(sleuth.video_count(), 2);
        assert_eq!(sleuth.total_likes, 6);
        assert_eq!(sleuth.author_id, Some("UC1"));
        assert_eq!(sleuth.author_url, Some("https://www.youtube.com/@Sleuth"));
    }

    #[test]
    fn test_top_users_by_key() {
        let corpus = corpus();
        let db = UserDatabase::build(&corpus);

        let by_comments: Vec<&str> = db.top_users(2, UserSortKey::Comments).iter().map(|u| u.author).collect();
        assert_eq!(by_comments, vec!["@Sleuth", "@Other"]);

        let by_likes: Vec<&str> = db.top_users(1, UserSortKey::Likes).iter().map(|u| u.author).collect();
        assert_eq!(by_likes, vec!["@Other"]);
    }

    #[test]
    fn test_cross_video_users() {
        let corpus = corpus();
        let db = UserDatabase::build(&corpus);

        let names: Vec<&str> = db.cross_video_users(2).iter().map(|u| u.author).collect();
        assert_eq!(names, vec!["@Sleuth", "@Other"]);
        assert!(db.cross_video_users(3).is_empty());
    }

    #[test]
    fn test_suggestions() {
        let corpus = corpus();
        let db = UserDatabase::build(&corpus);

        assert_eq!(db.suggestions("sle"), vec!["@Sleuth"]);
        assert!(db.suggestions("sleuthhound").is_empty());
    }

    #[test]
    fn test_profile_analysis() {
        let corpus = corpus();
        let db = UserDatabase::build(&corpus);
        let profile = UserProfile::analyze(db.get("@Sleuth").unwrap(), &ProfileConfig::default());

        assert_eq!(profile.total_comments, 2);
        assert_eq!(profile.videos_participated, 2);
        assert_eq!(profile.avg_likes_per_comment, 3.0);
        assert_eq!(profile.total_words, 8);
        assert_eq!(profile.unique_words, 5);
        assert_eq!(profile.top_keywords[0], KeywordCount { word: "suspect".to_string(), count: 3 });
        assert!(profile.top_keywords.iter().all(|k| k.word != "the"));

        assert_eq!(profile.first_comment, "2023-11-14 22:13:20");
        assert_eq!(profile.last_comment, "2023-11-15 23:13:20");
        assert_eq!(profile.activity_span_days, 1.0);
        assert_eq!(profile.comments_per_day, 1.92);
        assert_eq!(profile.most_active_hour, "22:00-23:00");

        assert_eq!(profile.root_comments, 1);
        assert_eq!(profile.reply_comments, 1);
        assert_eq!(profile.reply_ratio, 50.0);
    }

    #[test]
    fn test_profile_without_timestamps() {
        let corpus = corpus();
        let db = UserDatabase::build(&corpus);
        let profile = UserProfile::analyze(db.get("@Third").unwrap(), &ProfileConfig::default());

        assert_eq!(profile.first_comment, "Unknown");
        assert_eq!(profile.most_active_hour, "Unknown");
        assert_eq!(profile.comments_per_day, 0.0);
        assert_eq!(profile.author_id, None);
        assert_eq!(profile.avg_comment_length, 5.0);
    }

    #[test]
    fn test_single_timestamp_counts_all_comments_per_day() {
        let corpus = corpus();
        let db = UserDatabase::build(&corpus);
        let profile = UserProfile::analyze(db.get("@Other").unwrap(), &ProfileConfig::default());

        assert_eq!(profile.activity_span_days, 0.0);
        assert_eq!(profile.comments_per_day, 2.0);
    }
}
