//! Core types and data structures for the airdrop catalog and per-user state.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Lifecycle status of an airdrop campaign.
///
/// Decoding is case-insensitive; an unknown value reads as `Active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Status {
    #[default]
    Active,
    Hot,
    EndingSoon,
    Expired,
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "active" => Status::Active,
            "hot" => Status::Hot,
            "ending_soon" => Status::EndingSoon,
            "expired" => Status::Expired,
            _ => {
                warn!(status = %raw, "Unknown airdrop status, treating as active");
                Status::Active
            }
        }
    }
}

/// Effort rating shown next to each campaign.
///
/// Decoding is case-insensitive; an unknown value reads as `Easy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl From<String> for Difficulty {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => {
                warn!(difficulty = %raw, "Unknown difficulty, treating as easy");
                Difficulty::Easy
            }
        }
    }
}

/// Named URLs attached to a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    /// Any other named link carried by the document
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

impl Links {
    pub fn is_empty(&self) -> bool {
        self.website.is_none()
            && self.twitter.is_none()
            && self.discord.is_none()
            && self.other.is_empty()
    }
}

fn default_category() -> String {
    "General".to_string()
}

fn default_tba() -> String {
    "TBA".to_string()
}

/// A single catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropRecord {
    /// Unique catalog identifier
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub status: Status,
    /// Human-readable end date as written in the catalog
    #[serde(default = "default_tba")]
    pub end_date: String,
    #[serde(default = "default_tba")]
    pub reward: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub links: Links,
    /// Ordered participation steps
    #[serde(default)]
    pub tasks: Vec<String>,
    /// Banner image filename, relative to the banners directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl AirdropRecord {
    pub fn is_hot(&self) -> bool {
        self.status == Status::Hot
    }
}

/// Sanitized identity used as the storage key for one user's partitions.
///
/// Distinct raw identities that sanitize to the same key share state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserIdentity(String);

impl UserIdentity {
    /// Key used when sanitization leaves nothing behind.
    pub const UNKNOWN: &'static str = "unknown";

    /// Strip leading `@` markers, then keep alphanumerics, `_` and `-`.
    pub fn sanitize(raw: &str) -> Self {
        let cleaned: String = raw
            .trim_start_matches('@')
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect();

        if cleaned.is_empty() {
            Self(Self::UNKNOWN.to_string())
        } else {
            Self(cleaned)
        }
    }

    /// Chat users are keyed by username when they have one, otherwise by numeric id.
    pub fn from_chat_user(username: Option<&str>, user_id: u64) -> Self {
        match username {
            Some(name) if !name.is_empty() => Self::sanitize(name),
            _ => Self::sanitize(&user_id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered set of airdrop ids saved by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(rename = "airdrops", default)]
    ids: Vec<String>,
}

impl Wishlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Appends `id` unless already present. Returns whether the set changed.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Removes `id` if present, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Wishlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut wishlist = Wishlist::new();
        for id in iter {
            let id = id.into();
            wishlist.insert(&id);
        }
        wishlist
    }
}

/// How often a reminder should fire. Only one-shot reminders exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Once,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Once => "once",
        }
    }
}

/// One entry of a user's append-only reminder log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub airdrop_id: String,
    /// Relative time label such as "1 hour"; never resolved to a timestamp
    pub remind_time: String,
    pub frequency: Frequency,
    #[serde(with = "created_at_format")]
    pub created_at: DateTime<Utc>,
}

impl ReminderEntry {
    pub fn new(airdrop_id: &str, remind_time: &str, frequency: Frequency) -> Self {
        Self {
            airdrop_id: airdrop_id.to_string(),
            remind_time: remind_time.to_string(),
            frequency,
            created_at: Utc::now(),
        }
    }
}

/// RFC 3339 on write. Reads also accept the space-separated form older
/// reminder documents were written with, interpreted as UTC.
pub(crate) mod created_at_format {
    use super::*;

    const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, LEGACY_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid created_at timestamp '{}': {}", raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_marker_and_specials() {
        assert_eq!(UserIdentity::sanitize("@alice").as_str(), "alice");
        assert_eq!(UserIdentity::sanitize("@@bob_the-builder!").as_str(), "bob_the-builder");
        assert_eq!(UserIdentity::sanitize("../etc/passwd").as_str(), "etcpasswd");
    }

    #[test]
    fn test_sanitize_empty_maps_to_unknown() {
        assert_eq!(UserIdentity::sanitize("").as_str(), "unknown");
        assert_eq!(UserIdentity::sanitize("@").as_str(), "unknown");
        assert_eq!(UserIdentity::sanitize("!!!").as_str(), "unknown");
    }

    #[test]
    fn test_sanitize_collisions_share_key() {
        assert_eq!(UserIdentity::sanitize("a.b"), UserIdentity::sanitize("ab"));
    }

    #[test]
    fn test_from_chat_user_falls_back_to_id() {
        assert_eq!(UserIdentity::from_chat_user(Some("carol"), 42).as_str(), "carol");
        assert_eq!(UserIdentity::from_chat_user(None, 42).as_str(), "42");
        assert_eq!(UserIdentity::from_chat_user(Some(""), 7).as_str(), "7");
    }

    #[test]
    fn test_wishlist_set_semantics() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.insert("a"));
        assert!(wishlist.insert("b"));
        assert!(!wishlist.insert("a"));
        assert_eq!(wishlist.ids(), &["a".to_string(), "b".to_string()]);

        assert!(!wishlist.remove("missing"));
        assert!(wishlist.remove("a"));
        assert_eq!(wishlist.ids(), &["b".to_string()]);
    }

    #[test]
    fn test_record_defaults_from_sparse_document() {
        let record: AirdropRecord = serde_json::from_str(
            r#"{"id": "x", "title": "X", "description": "desc"}"#,
        )
        .unwrap();

        assert_eq!(record.status, Status::Active);
        assert_eq!(record.difficulty, Difficulty::Easy);
        assert_eq!(record.category, "General");
        assert_eq!(record.reward, "TBA");
        assert!(record.links.is_empty());
        assert!(record.banner.is_none());
    }

    #[test]
    fn test_status_and_difficulty_decode_leniently() {
        let record: AirdropRecord = serde_json::from_str(
            r#"{"id": "x", "title": "X", "description": "d", "status": "HOT",
                "difficulty": "hard"}"#,
        )
        .unwrap();
        assert_eq!(record.status, Status::Hot);
        assert_eq!(record.difficulty, Difficulty::Hard);

        let record: AirdropRecord = serde_json::from_str(
            r#"{"id": "y", "title": "Y", "description": "d", "status": "paused",
                "difficulty": "?"}"#,
        )
        .unwrap();
        assert_eq!(record.status, Status::Active);
        assert_eq!(record.difficulty, Difficulty::Easy);

        assert_eq!(Status::from("Ending Soon".to_string()), Status::EndingSoon);
        assert_eq!(serde_json::to_value(Status::EndingSoon).unwrap(), "ending_soon");
        assert_eq!(serde_json::to_value(Difficulty::Medium).unwrap(), "Medium");
    }

    #[test]
    fn test_links_keep_unknown_names() {
        let links: Links = serde_json::from_str(
            r#"{"website": "https://a.io", "telegram": "https://t.me/a"}"#,
        )
        .unwrap();

        assert_eq!(links.website.as_deref(), Some("https://a.io"));
        assert_eq!(links.other.get("telegram").map(String::as_str), Some("https://t.me/a"));
    }

    #[test]
    fn test_created_at_accepts_legacy_format() {
        let parsed = created_at_format::parse("2025-07-01 12:30:45.123456").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-07-01T12:30:45.123456+00:00");

        let parsed = created_at_format::parse("2025-07-01T12:30:45+00:00").unwrap();
        assert_eq!(parsed.timestamp(), 1751373045);
    }
}
