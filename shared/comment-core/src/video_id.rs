//! Video id extraction from collector file names

/// Suffixes written by the comment collector after the video id
const KNOWN_SUFFIXES: [&str; 2] = [".info.json", ".comments.json"];

/// Id reported when nothing usable is left of the file name
pub const UNKNOWN_VIDEO_ID: &str = "unknown";

/// Extract the video id embedded in a corpus file name.
///
/// `<id>.info.json` and `<id>.comments.json` yield `<id>`. Any other name
/// yields the stem up to the first `_` (older `<id>_comments.json` layout),
/// or the whole stem when it has no separator.
pub fn extract_video_id(filename: &str) -> String {
    for suffix in KNOWN_SUFFIXES {
        if let Some(id) = filename.strip_suffix(suffix) {
            return non_empty_or_unknown(id);
        }
    }

    let stem = match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    };

    let id = stem.split('_').next().unwrap_or(stem);
    non_empty_or_unknown(id)
}

fn non_empty_or_unknown(id: &str) -> String {
    if id.is_empty() {
        UNKNOWN_VIDEO_ID.to_string()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_json_suffix() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ.info.json"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_comments_json_suffix_keeps_underscores() {
        assert_eq!(extract_video_id("ab_cdEFgh12.comments.json"), "ab_cdEFgh12");
    }

    #[test]
    fn test_prefix_before_separator() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ_comments.json"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_plain_stem() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ.json"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_nothing_left() {
        assert_eq!(extract_video_id(".info.json"), "unknown");
        assert_eq!(extract_video_id("_x.json"), "unknown");
    }
}
