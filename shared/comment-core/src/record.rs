//! Comment record as written by the comment collector

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Author name used when a record carries none
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Author id used when a record carries none
pub const UNKNOWN_AUTHOR_ID: &str = "N/A";

/// `parent` value of a top-level comment
pub const ROOT_PARENT: &str = "root";

/// Known fields of a downloaded comment; everything is optional on disk
#[derive(Debug, Default, Deserialize)]
struct RecordFields {
    text: Option<String>,
    author: Option<String>,
    author_id: Option<String>,
    author_url: Option<String>,
    like_count: Option<u64>,
    author_is_uploader: Option<bool>,
    author_is_verified: Option<bool>,
    timestamp: Option<i64>,
    parent: Option<String>,
    id: Option<String>,
    #[serde(rename = "_time_text")]
    time_text: Option<String>,
}

/// A single comment, immutable once loaded.
///
/// Typed accessors apply the collector's defaults (`"Unknown"` author,
/// `"N/A"` author id, zero likes, `"root"` parent). The original JSON object
/// is kept verbatim and is what gets serialized back out.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    text: String,
    author: String,
    author_id: String,
    author_url: Option<String>,
    like_count: u64,
    author_is_uploader: bool,
    author_is_verified: bool,
    timestamp: i64,
    parent: String,
    id: Option<String>,
    time_text: Option<String>,
    raw: Value,
}

impl CommentRecord {
    /// Build a record from one element of a comment array.
    ///
    /// Fails when the value is not an object or a known field has the wrong type.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        if !raw.is_object() {
            return Err(serde_json::Error::custom("comment is not a JSON object"));
        }

        let fields = RecordFields::deserialize(&raw)?;

        Ok(Self {
            text: fields.text.unwrap_or_default(),
            author: fields.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            author_id: fields.author_id.unwrap_or_else(|| UNKNOWN_AUTHOR_ID.to_string()),
            author_url: fields.author_url,
            like_count: fields.like_count.unwrap_or(0),
            author_is_uploader: fields.author_is_uploader.unwrap_or(false),
            author_is_verified: fields.author_is_verified.unwrap_or(false),
            timestamp: fields.timestamp.unwrap_or(0),
            parent: fields.parent.unwrap_or_else(|| ROOT_PARENT.to_string()),
            id: fields.id,
            time_text: fields.time_text,
            raw,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Records without text never take part in matching
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn author_url(&self) -> Option<&str> {
        self.author_url.as_deref()
    }

    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    pub fn is_uploader(&self) -> bool {
        self.author_is_uploader
    }

    pub fn is_verified(&self) -> bool {
        self.author_is_verified
    }

    /// Epoch seconds; 0 means the post time is unknown
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn is_reply(&self) -> bool {
        self.parent != ROOT_PARENT
    }

    pub fn comment_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Human readable post time as scraped ("2 years ago")
    pub fn time_text(&self) -> Option<&str> {
        self.time_text.as_deref()
    }

    /// The comment exactly as it appeared in the source file
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for CommentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CommentRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        CommentRecord::from_value(raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_for_missing_fields() {
        let record = CommentRecord::from_value(json!({"text": "hello"})).unwrap();

        assert_eq!(record.text(), "hello");
        assert_eq!(record.author(), "Unknown");
        assert_eq!(record.author_id(), "N/A");
        assert_eq!(record.like_count(), 0);
        assert_eq!(record.timestamp(), 0);
        assert!(!record.is_uploader());
        assert!(!record.is_verified());
        assert!(!record.is_reply());
    }

    #[test]
    fn test_missing_text_is_not_an_error() {
        let record = CommentRecord::from_value(json!({"author": "Alice"})).unwrap();
        assert!(!record.has_text());
    }

    #[test]
    fn test_reply_detection() {
        let record = CommentRecord::from_value(json!({"text": "re", "parent": "Ugx123"})).unwrap();
        assert!(record.is_reply());
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        assert!(CommentRecord::from_value(json!({"text": "x", "like_count": "many"})).is_err());
        assert!(CommentRecord::from_value(json!("just a string")).is_err());
    }

    #[test]
    fn test_serializes_original_object() {
        let raw = json!({"text": "hi", "like_count": 3, "extra": {"nested": true}});
        let record = CommentRecord::from_value(raw.clone()).unwrap();

        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }
}
