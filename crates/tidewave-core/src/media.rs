use std::sync::LazyLock;

use regex::Regex;
use tidewave_types::models::{MediaEmbed, SiteKind};

struct SitePattern {
    site: SiteKind,
    pattern: Regex,
    id_group: usize,
    format_group: Option<usize>,
}

impl SitePattern {
    fn new(site: SiteKind, pattern: &str, id_group: usize, format_group: Option<usize>) -> Self {
        Self {
            site,
            pattern: Regex::new(pattern).expect("valid site pattern"),
            id_group,
            format_group,
        }
    }
}

/// Checked in order; the first match wins.
static SITE_PATTERNS: LazyLock<Vec<SitePattern>> = LazyLock::new(|| {
    vec![
        SitePattern::new(
            SiteKind::Youtube,
            r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:\S*?&)?v=|embed/|v/|e/|shorts/)|youtube-nocookie\.com/embed/|youtu\.be/)([A-Za-z0-9_-]{11})",
            1,
            None,
        ),
        SitePattern::new(
            SiteKind::Reddit,
            r"^(?:https?://)?(?:www\.|old\.|new\.)?reddit\.com/r/([A-Za-z0-9_]+)/comments/([A-Za-z0-9]+)",
            2,
            Some(1),
        ),
        SitePattern::new(
            SiteKind::Imgflip,
            r"^(?:https?://)?(?:www\.)?imgflip\.com/(i|gif)/([A-Za-z0-9]+)",
            2,
            Some(1),
        ),
        SitePattern::new(
            SiteKind::Instagram,
            r"^(?:https?://)?(?:www\.)?instagram\.com/(p|reel|tv)/([A-Za-z0-9_-]+)",
            2,
            Some(1),
        ),
        SitePattern::new(
            SiteKind::Twitter,
            r"^(?:https?://)?(?:www\.|mobile\.)?(?:twitter|x)\.com/([A-Za-z0-9_]{1,15})/status/([0-9]+)",
            2,
            Some(1),
        ),
        SitePattern::new(
            SiteKind::Facebook,
            r"^(?:https?://)?(?:www\.|m\.)?facebook\.com/(?:[^/\s]+/)?(videos|posts)/([0-9]+)",
            2,
            Some(1),
        ),
        SitePattern::new(
            SiteKind::Tiktok,
            r"^(?:https?://)?(?:www\.|m\.)?tiktok\.com/@([A-Za-z0-9_.]+)/video/([0-9]+)",
            2,
            Some(1),
        ),
    ]
});

/// Match `url` against the known site shapes. `None` means the link is kept
/// without structured metadata.
pub fn classify_media(url: &str) -> Option<MediaEmbed> {
    let url = url.trim();
    SITE_PATTERNS.iter().find_map(|entry| {
        let caps = entry.pattern.captures(url)?;
        let external_id = caps.get(entry.id_group)?.as_str().to_string();
        let format = entry
            .format_group
            .and_then(|group| caps.get(group))
            .map(|m| m.as_str().to_string());
        Some(MediaEmbed {
            site: entry.site,
            external_id,
            format,
        })
    })
}

/// Iframe source for an embed, when the site offers one keyed by id alone.
pub fn embed_url(embed: &MediaEmbed) -> Option<String> {
    let id = &embed.external_id;
    let format = embed.format.as_deref();
    match embed.site {
        SiteKind::Youtube => Some(format!(
            "https://www.youtube-nocookie.com/embed/{id}?start=0&autoplay=1&autohide=1"
        )),
        SiteKind::Reddit => format.map(|sub| {
            format!("https://www.redditmedia.com/r/{sub}/comments/{id}/?ref_source=embed&embed=true")
        }),
        SiteKind::Imgflip => Some(format!("https://imgflip.com/embed/{id}")),
        SiteKind::Instagram => Some(format!(
            "https://www.instagram.com/{}/{id}/embed",
            format.unwrap_or("p")
        )),
        SiteKind::Twitter => Some(format!("https://platform.twitter.com/embed/Tweet.html?id={id}")),
        // Facebook's plugin needs the full page URL, not just the id
        SiteKind::Facebook => None,
        SiteKind::Tiktok => Some(format!("https://www.tiktok.com/embed/v2/{id}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(url: &str) -> (SiteKind, String, Option<String>) {
        let embed = classify_media(url).unwrap_or_else(|| panic!("no match for {url}"));
        (embed.site, embed.external_id, embed.format)
    }

    #[test]
    fn youtube_shapes() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(
                classified(url),
                (SiteKind::Youtube, "dQw4w9WgXcQ".to_string(), None),
                "{url}"
            );
        }
    }

    #[test]
    fn other_sites() {
        assert_eq!(
            classified("https://www.reddit.com/r/rust/comments/abc123/some_title/"),
            (SiteKind::Reddit, "abc123".into(), Some("rust".into()))
        );
        assert_eq!(
            classified("https://imgflip.com/i/7xk2zq"),
            (SiteKind::Imgflip, "7xk2zq".into(), Some("i".into()))
        );
        assert_eq!(
            classified("https://www.instagram.com/reel/Cx_Y-1z/"),
            (SiteKind::Instagram, "Cx_Y-1z".into(), Some("reel".into()))
        );
        assert_eq!(
            classified("https://x.com/rustlang/status/1790000000000000000"),
            (SiteKind::Twitter, "1790000000000000000".into(), Some("rustlang".into()))
        );
        assert_eq!(
            classified("https://www.facebook.com/someone/videos/123456789"),
            (SiteKind::Facebook, "123456789".into(), Some("videos".into()))
        );
        assert_eq!(
            classified("https://www.tiktok.com/@some.user/video/7200000000000000000"),
            (SiteKind::Tiktok, "7200000000000000000".into(), Some("some.user".into()))
        );
    }

    #[test]
    fn unknown_links_are_unclassified() {
        assert_eq!(classify_media("https://example.com/x"), None);
        assert_eq!(classify_media("https://example.com/?next=youtu.be/dQw4w9WgXcQ"), None);
        assert_eq!(classify_media(""), None);
    }

    #[test]
    fn youtube_embed_uses_nocookie_host() {
        let embed = classify_media("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(
            embed_url(&embed).unwrap(),
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?start=0&autoplay=1&autohide=1"
        );
    }

    #[test]
    fn facebook_has_no_id_only_embed() {
        let embed = classify_media("https://facebook.com/posts/42").unwrap();
        assert_eq!(embed_url(&embed), None);
    }
}
