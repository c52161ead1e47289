//! Terminal listings for search results, author statistics and profiles
//!
//! Every function returns the rendered text; binaries decide where it goes.

use crate::authors::{AuthorRollup, AuthorStats, AuthorSummary};
use crate::profile::{UserProfile, UserRecord, UserSortKey};
use crate::search::SearchResult;
use chrono::DateTime;
use comment_core::CommentRecord;
use std::fmt::Write;
use std::ops::Range;
use url::Url;

const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const BLUE: &str = "\x1b[94m";
const RESET: &str = "\x1b[0m";

/// Marker used around matches when color is off
const PLAIN_MARK: &str = "**";

const WATCH_URL: &str = "https://www.youtube.com/watch";
const RULE_WIDTH: usize = 60;
const WIDE_RULE_WIDTH: usize = 70;

/// Authors listed by the result-set statistics
pub const AUTHOR_STATS_TOP: usize = 10;

/// How listings are decorated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// ANSI colors
    pub color: bool,

    /// Mark matched text
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: true,
            highlight: true,
        }
    }
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self {
            color: false,
            highlight: false,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

fn rule(width: usize) -> String {
    "=".repeat(width)
}

/// Interleave plain text with marked match ranges.
///
/// `ranges` must be sorted, disjoint byte ranges on char boundaries, as
/// produced by the matcher. Out-of-bounds ranges are ignored.
pub fn highlight_text(text: &str, ranges: &[Range<usize>], options: RenderOptions) -> String {
    if !options.highlight || ranges.is_empty() {
        return text.to_string();
    }

    let (open, close) = if options.color {
        (RED, RESET)
    } else {
        (PLAIN_MARK, PLAIN_MARK)
    };

    let mut out = String::with_capacity(text.len() + ranges.len() * (open.len() + close.len()));
    let mut cursor = 0;
    for range in ranges {
        if range.start < cursor || text.get(range.clone()).is_none() {
            continue;
        }
        out.push_str(&text[cursor..range.start]);
        out.push_str(open);
        out.push_str(&text[range.clone()]);
        out.push_str(close);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Human post time: the collector's text, else the UTC timestamp, else "Unknown"
pub fn format_post_time(comment: &CommentRecord) -> String {
    if let Some(time_text) = comment.time_text() {
        return time_text.to_string();
    }

    if comment.timestamp() > 0 {
        if let Some(time) = DateTime::from_timestamp(comment.timestamp(), 0) {
            return time.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }

    "Unknown".to_string()
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    match Url::parse_with_params(WATCH_URL, &[("v", video_id)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}?v={}", WATCH_URL, video_id),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Full listing of a result set; comment text is never truncated
pub fn render_results(results: &[SearchResult<'_>], options: RenderOptions) -> String {
    if results.is_empty() {
        return "No results found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", rule(RULE_WIDTH));
    let _ = writeln!(out, "Top {} Results", results.len());
    let _ = writeln!(out, "{}\n", rule(RULE_WIDTH));

    for (i, result) in results.iter().enumerate() {
        let comment = result.comment;

        let _ = writeln!(out, "[{}] Video ID: {}", i + 1, result.video_id);
        let _ = writeln!(out, "    Author: {} ({})", comment.author(), comment.author_id());
        let _ = writeln!(
            out,
            "    Likes: {} | Verified: {} | Uploader: {}",
            comment.like_count(),
            yes_no(comment.is_verified()),
            yes_no(comment.is_uploader())
        );
        let _ = writeln!(out, "    Posted: {}", format_post_time(comment));

        if result.relevance_score > 0 {
            let _ = writeln!(out, "    Relevance Score: {}", result.relevance_score);
        }

        let text = highlight_text(comment.text(), &result.highlight_ranges, options);
        let _ = writeln!(out, "    Comment: {}", text);
        let _ = writeln!(out, "    URL: {}\n", watch_url(result.video_id));
    }

    out
}

/// Unique author count and the most active authors of a result set
pub fn render_author_stats(rollup: &AuthorRollup<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule(RULE_WIDTH));
    let _ = writeln!(out, "Author Statistics");
    let _ = writeln!(out, "{}\n", rule(RULE_WIDTH));
    let _ = writeln!(out, "Total unique authors: {}\n", rollup.len());
    let _ = writeln!(out, "Top {} most active authors:", AUTHOR_STATS_TOP);

    for (i, stats) in rollup.top(AUTHOR_STATS_TOP).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, stats.author);
        let _ = writeln!(
            out,
            "   Comments: {} | Total likes: {}",
            stats.comment_count(),
            stats.total_likes
        );
    }

    out
}

fn badges(is_verified: bool, is_uploader: bool, options: RenderOptions) -> String {
    let mut badges = Vec::new();
    if is_verified {
        badges.push(options.paint(BLUE, "✓ Verified"));
    }
    if is_uploader {
        badges.push(options.paint(GREEN, "⬆ Uploader"));
    }

    if badges.is_empty() {
        String::new()
    } else {
        format!(" [{}]", badges.join(", "))
    }
}

/// Ranked most-active-authors listing
pub fn render_most_active(top: &[&AuthorStats<'_>], options: RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule(RULE_WIDTH));
    let _ = writeln!(out, "Top {} Most Active Users", top.len());
    let _ = writeln!(out, "{}\n", rule(RULE_WIDTH));

    for (i, stats) in top.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}{}",
            options.paint(YELLOW, &format!("{}. {}", i + 1, stats.author)),
            badges(stats.is_verified, stats.is_uploader, options)
        );
        let _ = writeln!(out, "   Author ID: {}", stats.author_id);
        let _ = writeln!(
            out,
            "   Comments: {} | Total likes: {}",
            stats.comment_count(),
            stats.total_likes
        );
        let _ = writeln!(out, "   Avg likes per comment: {:.1}\n", stats.average_likes());
    }

    out
}

/// Header shown before a user's extracted comments
pub fn render_user_header(summary: &AuthorSummary, options: RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule(RULE_WIDTH));
    let _ = writeln!(out, "User: {}", options.paint(GREEN, &summary.author));
    let _ = writeln!(out, "Author ID: {}", summary.author_id);

    let mut badges = Vec::new();
    if summary.is_verified {
        badges.push("Verified");
    }
    if summary.is_uploader {
        badges.push("Uploader");
    }
    if !badges.is_empty() {
        let _ = writeln!(out, "Badges: {}", badges.join(", "));
    }

    let _ = writeln!(out, "Total comments: {}", summary.comment_count);
    let _ = writeln!(out, "Total likes: {}", summary.total_likes);
    let _ = writeln!(out, "{}\n", rule(RULE_WIDTH));
    out
}

/// "Did you mean" block for an unknown user
pub fn render_suggestions(username: &str, suggestions: &[String]) -> String {
    let mut out = format!("✗ User '{}' not found in comments\n", username);
    let _ = writeln!(out, "\nDid you mean one of these?");
    for name in suggestions {
        let _ = writeln!(out, "  - {}", name);
    }
    out
}

pub fn render_profile(profile: &UserProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule(WIDE_RULE_WIDTH));
    let _ = writeln!(out, "USER PROFILE: {}", profile.username);
    let _ = writeln!(out, "{}", rule(WIDE_RULE_WIDTH));

    let _ = writeln!(out, "\nBASIC INFORMATION:");
    let _ = writeln!(out, "  Author ID: {}", profile.author_id.as_deref().unwrap_or("N/A"));
    let _ = writeln!(out, "  Profile URL: {}", profile.author_url.as_deref().unwrap_or("N/A"));
    let _ = writeln!(out, "  Verified: {}", yes_no(profile.is_verified));
    let _ = writeln!(out, "  Channel Owner: {}", yes_no(profile.is_uploader));

    let _ = writeln!(out, "\nACTIVITY METRICS:");
    let _ = writeln!(out, "  Total Comments: {}", profile.total_comments);
    let _ = writeln!(out, "  Videos Participated: {}", profile.videos_participated);
    let _ = writeln!(out, "  First Comment: {}", profile.first_comment);
    let _ = writeln!(out, "  Last Comment: {}", profile.last_comment);
    let _ = writeln!(out, "  Activity Span: {} days", profile.activity_span_days);
    let _ = writeln!(out, "  Comments per Day: {}", profile.comments_per_day);
    let _ = writeln!(out, "  Most Active Hour: {}", profile.most_active_hour);

    let _ = writeln!(out, "\nENGAGEMENT:");
    let _ = writeln!(out, "  Total Likes Received: {}", profile.total_likes);
    let _ = writeln!(out, "  Average Likes per Comment: {:.2}", profile.avg_likes_per_comment);
    let _ = writeln!(out, "  Root Comments: {}", profile.root_comments);
    let _ = writeln!(
        out,
        "  Reply Comments: {} ({}%)",
        profile.reply_comments, profile.reply_ratio
    );

    let _ = writeln!(out, "\nCONTENT ANALYSIS:");
    let _ = writeln!(out, "  Total Words: {}", profile.total_words);
    let _ = writeln!(out, "  Unique Words: {}", profile.unique_words);
    let _ = writeln!(out, "  Avg Comment Length: {:.1} characters", profile.avg_comment_length);

    let _ = writeln!(out, "\nTOP KEYWORDS:");
    for (i, keyword) in profile.top_keywords.iter().enumerate() {
        let _ = writeln!(out, "  {}. '{}' - {} times", i + 1, keyword.word, keyword.count);
    }

    let _ = writeln!(out, "\n{}", rule(WIDE_RULE_WIDTH));
    out
}

/// Name cut to 30 columns for the users table
fn fit_name(name: &str) -> String {
    if name.chars().count() > 30 {
        let head: String = name.chars().take(28).collect();
        format!("{}..", head)
    } else {
        name.to_string()
    }
}

pub fn render_top_users(users: &[&UserRecord<'_>], sort_by: UserSortKey) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule(WIDE_RULE_WIDTH));
    let _ = writeln!(
        out,
        "TOP {} USERS BY {}",
        users.len(),
        sort_by.as_str().to_uppercase()
    );
    let _ = writeln!(out, "{}\n", rule(WIDE_RULE_WIDTH));
    let _ = writeln!(
        out,
        "{:<4} {:<30} {:<10} {:<8} {:<8}",
        "#", "Username", "Comments", "Videos", "Likes"
    );
    let _ = writeln!(out, "{}", "-".repeat(WIDE_RULE_WIDTH));

    for (i, user) in users.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<30} {:<10} {:<8} {:<8}",
            i + 1,
            fit_name(user.author),
            user.comment_count(),
            user.video_count(),
            user.total_likes
        );
    }

    let _ = writeln!(out, "\n{}", rule(WIDE_RULE_WIDTH));
    out
}

/// Users seen on several videos; at most `limit` are listed
pub fn render_cross_video(users: &[&UserRecord<'_>], min_videos: usize, limit: usize) -> String {
    let mut out = format!(
        "Found {} users who commented on {}+ videos:\n\n",
        users.len(),
        min_videos
    );

    for user in users.iter().take(limit) {
        let _ = writeln!(out, "  {}", user.author);
        let _ = writeln!(
            out,
            "    Videos: {} | Comments: {} | Likes: {}",
            user.video_count(),
            user.comment_count(),
            user.total_likes
        );
    }

    if users.len() > limit {
        let _ = writeln!(out, "\n  ... and {} more", users.len() - limit);
    }

    out
}
