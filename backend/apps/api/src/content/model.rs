//! Content Records

use std::fmt;

use chrono::{DateTime, Utc};
use platform::crypto::random_bytes;
use serde::{Serialize, Serializer};

/// 24-hex-digit record id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn generate() -> Self {
        Self(hex::encode(random_bytes(12)))
    }

    /// Accept exactly 24 hex digits, either case
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Epoch milliseconds rendered as an ISO-8601 string
fn iso_timestamp<S: Serializer>(ms: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    match DateTime::<Utc>::from_timestamp_millis(*ms) {
        Some(at) => at.serialize(serializer),
        None => serializer.serialize_i64(*ms),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub views: u64,
    pub likes: u64,
}

impl Stats {
    /// Shown before anyone has viewed or liked
    pub const INITIAL: Stats = Stats {
        views: 150,
        likes: 42,
    };
    /// Starting point when the first event is a view or like
    pub const ZERO: Stats = Stats { views: 0, likes: 0 };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub text: String,
    #[serde(serialize_with = "iso_timestamp")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedText {
    pub ar: String,
    pub en: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleComment {
    pub name: String,
    pub text: String,
    #[serde(serialize_with = "iso_timestamp")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: LocalizedText,
    pub author: LocalizedText,
    pub content: LocalizedText,
    pub image: String,
    pub image_position: u8,
    pub likes: u64,
    pub comments: Vec<ArticleComment>,
    #[serde(serialize_with = "iso_timestamp")]
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id() {
        let id = ObjectId::generate();
        assert_eq!(id.as_str().len(), 24);
        assert_eq!(ObjectId::parse(id.as_str()), Some(id));

        assert_eq!(
            ObjectId::parse("65A1B2C3D4E5F60718293A4B").unwrap().as_str(),
            "65a1b2c3d4e5f60718293a4b"
        );
        assert!(ObjectId::parse("65a1b2c3d4e5f60718293a4").is_none());
        assert!(ObjectId::parse("zz a1b2c3d4e5f60718293a4b").is_none());
        assert!(ObjectId::parse("not-an-id").is_none());
    }

    #[test]
    fn test_comment_wire_shape() {
        let comment = Comment {
            id: ObjectId::parse("65a1b2c3d4e5f60718293a4b").unwrap(),
            name: "Sara".into(),
            text: "hello".into(),
            timestamp: 0,
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["_id"], "65a1b2c3d4e5f60718293a4b");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
    }
}
