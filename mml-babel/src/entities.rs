//! Entity records: the side-channel index of the legacy format.
//!
//! Each record describes a span of rendered text. Offsets are UTF-16 code
//! units (see [`crate::common::utf16`]). The serde representation is the wire
//! shape legacy clients read:
//!
//! ```json
//! {"type":"USER_FOLLOW","id":123,"screenName":"jdoe","prettyName":"Jane Doe",
//!  "text":"@Jane Doe","indexStart":0,"indexEnd":9,"userType":"lc"}
//! ```

use crate::common::utf16;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityRecord {
    Url(UrlEntity),
    UserFollow(MentionEntity),
    Keyword(KeywordEntity),
    DateTime(DateTimeEntity),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlEntity {
    pub id: String,
    pub text: String,
    pub index_start: usize,
    pub index_end: usize,
    pub expanded_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionEntity {
    pub id: u64,
    pub screen_name: String,
    pub pretty_name: String,
    pub text: String,
    pub index_start: usize,
    pub index_end: usize,
    pub user_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordEntity {
    pub id: String,
    pub text: String,
    pub index_start: usize,
    pub index_end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeEntity {
    pub id: String,
    pub text: String,
    pub index_start: usize,
    pub index_end: usize,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl EntityRecord {
    pub fn text(&self) -> &str {
        match self {
            EntityRecord::Url(e) => &e.text,
            EntityRecord::UserFollow(e) => &e.text,
            EntityRecord::Keyword(e) => &e.text,
            EntityRecord::DateTime(e) => &e.text,
        }
    }

    /// `(indexStart, indexEnd)`
    pub fn span(&self) -> (usize, usize) {
        match self {
            EntityRecord::Url(e) => (e.index_start, e.index_end),
            EntityRecord::UserFollow(e) => (e.index_start, e.index_end),
            EntityRecord::Keyword(e) => (e.index_start, e.index_end),
            EntityRecord::DateTime(e) => (e.index_start, e.index_end),
        }
    }

    pub fn id(&self) -> String {
        match self {
            EntityRecord::Url(e) => e.id.clone(),
            EntityRecord::UserFollow(e) => e.id.to_string(),
            EntityRecord::Keyword(e) => e.id.clone(),
            EntityRecord::DateTime(e) => e.id.clone(),
        }
    }

    /// The exact text the record's span covers. For URLs that is the whole
    /// link markup, not just its title.
    pub fn spanned_text(&self) -> String {
        match self {
            EntityRecord::Url(e) => format!("[ {} ]({})", e.text, e.expanded_url),
            other => other.text().to_string(),
        }
    }

    /// Whether the record's span of `rendered` reads exactly its spanned text.
    pub fn matches(&self, rendered: &str) -> bool {
        let (start, end) = self.span();
        start < end && utf16::slice(rendered, start, end) == Some(self.spanned_text())
    }
}

/// Entity records grouped by kind, each list in render order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<EntityRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_mentions: Vec<EntityRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<EntityRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub datetimes: Vec<EntityRecord>,
}

impl Entities {
    pub fn push(&mut self, record: EntityRecord) {
        match record {
            EntityRecord::Url(_) => self.urls.push(record),
            EntityRecord::UserFollow(_) => self.user_mentions.push(record),
            EntityRecord::Keyword(_) => self.hashtags.push(record),
            EntityRecord::DateTime(_) => self.datetimes.push(record),
        }
    }

    /// All records, grouped by kind (not merged into document order).
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.urls
            .iter()
            .chain(&self.user_mentions)
            .chain(&self.hashtags)
            .chain(&self.datetimes)
    }

    pub fn len(&self) -> usize {
        self.urls.len() + self.user_mentions.len() + self.hashtags.len() + self.datetimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
