//! Database row types. These map directly to SQLite rows and are converted to
//! the `tidewave-types` models at the edge.

use chrono::{DateTime, NaiveDateTime, Utc};
use tidewave_types::models::{Media, Splash, Tide, User};
use tracing::warn;
use uuid::Uuid;

pub struct UserRow {
    pub username: String,
    pub public_id: String,
    pub password: String,
    pub joined_at: String,
}

pub struct TideRow {
    pub name: String,
    pub created_at: String,
}

pub struct SplashRow {
    pub id: i64,
    pub author: String,
    pub body: String,
    pub tides: String,
    pub media: Option<String>,
    pub created_at: String,
}

pub struct MediaFileRow {
    pub id: String,
    pub uploader: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: String,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            public_id: self.public_id.parse().unwrap_or_else(|e| {
                warn!("Corrupt public_id '{}' for user '{}': {}", self.public_id, self.username, e);
                Uuid::default()
            }),
            joined_at: parse_timestamp(&self.joined_at, &self.username),
            username: self.username,
        }
    }
}

impl TideRow {
    pub fn into_tide(self) -> Tide {
        Tide {
            created_at: parse_timestamp(&self.created_at, &self.name),
            name: self.name,
        }
    }
}

impl SplashRow {
    pub fn into_splash(self) -> Splash {
        let context = format!("splash {}", self.id);
        let tides = serde_json::from_str(&self.tides).unwrap_or_else(|e| {
            warn!("Corrupt tides '{}' on {}: {}", self.tides, context, e);
            Vec::new()
        });
        let media = self.media.as_deref().and_then(|raw| {
            serde_json::from_str::<Media>(raw)
                .map_err(|e| warn!("Corrupt media '{}' on {}: {}", raw, context, e))
                .ok()
        });
        Splash {
            id: self.id,
            author: self.author,
            created_at: parse_timestamp(&self.created_at, &context),
            body: self.body,
            tides,
            media,
        }
    }
}

/// Rows written by this crate hold RFC 3339 text; SQLite defaults hold
/// "YYYY-MM-DD HH:MM:SS" without a zone, which is read as UTC.
pub fn parse_timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_both_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T12:30:00+00:00", "t"), expected);
        assert_eq!(parse_timestamp("2024-05-01 12:30:00", "t"), expected);
        assert_eq!(parse_timestamp("garbage", "t"), DateTime::<Utc>::default());
    }

    #[test]
    fn corrupt_json_columns_degrade() {
        let row = SplashRow {
            id: 4,
            author: "alice".into(),
            body: "hi".into(),
            tides: "not json".into(),
            media: Some("{".into()),
            created_at: "2024-05-01 12:30:00".into(),
        };
        let splash = row.into_splash();
        assert!(splash.tides.is_empty());
        assert_eq!(splash.media, None);
    }
}
