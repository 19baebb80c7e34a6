use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub public_id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tide {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A post. `id` is assigned once by the allocator and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    pub id: i64,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub tides: Vec<String>,
    pub media: Option<Media>,
}

/// Media attached to a splash: an uploaded file or an external link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Upload { file_id: String },
    Link { url: String, embed: Option<MediaEmbed> },
}

/// Structured reference to content on a known external site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEmbed {
    pub site: SiteKind,
    pub external_id: String,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    Youtube,
    Reddit,
    Imgflip,
    Instagram,
    Twitter,
    Facebook,
    Tiktok,
}

impl SiteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Reddit => "reddit",
            Self::Imgflip => "imgflip",
            Self::Instagram => "instagram",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Tiktok => "tiktok",
        }
    }
}

/// Which splashes a feed shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Tide(String),
    Author(String),
}
