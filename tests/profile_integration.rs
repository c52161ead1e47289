use serde_json::json;
use std::fs;
use tempfile::TempDir;
use yt_comment_search::config::ProfileConfig;
use yt_comment_search::export::write_json;
use yt_comment_search::{CommentSearcher, CorpusLoader, UserDatabase, UserProfile, UserSortKey};

fn setup_corpus() -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    for (video, comments) in [
        (
            "case01_part1.json",
            json!([
                {"text": "Check the phone records", "author": "@Detective", "like_count": 30, "timestamp": 1_600_000_000},
                {"text": "Phone records were subpoenaed", "author": "@Lawyer", "like_count": 2, "timestamp": 1_600_003_600}
            ]),
        ),
        (
            "case02_part1.json",
            json!([
                {"text": "Phone records again", "author": "@Detective", "like_count": 10, "parent": "abc", "timestamp": 1_600_086_400},
                {"text": "Agreed", "author": "@Detective", "like_count": 0}
            ]),
        ),
    ] {
        fs::write(temp_dir.path().join(video), comments.to_string()).unwrap();
    }

    temp_dir
}

#[test]
fn test_profile_from_directory() {
    let temp_dir = setup_corpus();
    let searcher = CommentSearcher::load(&CorpusLoader::with_default_pattern(temp_dir.path()).unwrap());
    let db = UserDatabase::build(searcher.corpus());

    assert_eq!(db.len(), 2);
    assert_eq!(db.video_count(), 2);

    let detective = db.get("@Detective").unwrap();
    assert_eq!(detective.video_ids.iter().copied().collect::<Vec<_>>(), vec!["case01", "case02"]);

    let profile = UserProfile::analyze(detective, &ProfileConfig::default());
    assert_eq!(profile.total_comments, 3);
    assert_eq!(profile.videos_participated, 2);
    assert_eq!(profile.total_likes, 40);
    assert_eq!(profile.top_keywords[0].word, "phone");
    assert_eq!(profile.top_keywords[0].count, 2);
    assert_eq!(profile.activity_span_days, 1.0);
    assert_eq!(profile.reply_comments, 1);
    assert_eq!(profile.reply_ratio, 33.3);

    let out = temp_dir.path().join("profiles/detective.json");
    write_json(&out, &profile).unwrap();
    let saved: UserProfile = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved.username, "@Detective");
    assert_eq!(saved.top_keywords, profile.top_keywords);
    assert_eq!(saved.most_active_hour, profile.most_active_hour);
}

#[test]
fn test_top_users_and_cross_video() {
    let temp_dir = setup_corpus();
    let searcher = CommentSearcher::load(&CorpusLoader::with_default_pattern(temp_dir.path()).unwrap());
    let db = UserDatabase::build(searcher.corpus());

    let top = db.top_users(10, UserSortKey::Likes);
    assert_eq!(top[0].author, "@Detective");
    assert_eq!(top.len(), 2);

    let cross = db.cross_video_users(2);
    assert_eq!(cross.len(), 1);
    assert_eq!(cross[0].author, "@Detective");
}
