use std::fmt;

use tidewave_types::api::CreateSplashRequest;
use tidewave_types::models::Media;

use crate::error::CoreError;
use crate::filter::ScopeRegistry;
use crate::media::classify_media;

pub const MAX_BODY_CHARS: usize = 1000;
pub const MAX_TIDES_PER_SPLASH: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=32;
pub const TIDE_NAME_CHARS: std::ops::RangeInclusive<usize> = 1..=32;

/// Why a submission was refused. `code()` is what form redirects carry in
/// `?error=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyBody,
    BodyTooLong,
    TooManyTides,
    UnknownTide,
    MediaConflict,
    BadMediaLink,
    UnknownMedia,
    BadUsername,
    WeakPassword,
    BadTideName,
    UsernameTaken,
    UnknownUser,
    WrongPassword,
    TideExists,
}

const ALL: &[Rejection] = &[
    Rejection::EmptyBody,
    Rejection::BodyTooLong,
    Rejection::TooManyTides,
    Rejection::UnknownTide,
    Rejection::MediaConflict,
    Rejection::BadMediaLink,
    Rejection::UnknownMedia,
    Rejection::BadUsername,
    Rejection::WeakPassword,
    Rejection::BadTideName,
    Rejection::UsernameTaken,
    Rejection::UnknownUser,
    Rejection::WrongPassword,
    Rejection::TideExists,
];

impl Rejection {
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyBody => "empty_body",
            Self::BodyTooLong => "body_too_long",
            Self::TooManyTides => "too_many_tides",
            Self::UnknownTide => "unknown_tide",
            Self::MediaConflict => "media_conflict",
            Self::BadMediaLink => "bad_media_link",
            Self::UnknownMedia => "unknown_media",
            Self::BadUsername => "bad_username",
            Self::WeakPassword => "weak_password",
            Self::BadTideName => "bad_tide_name",
            Self::UsernameTaken => "username_taken",
            Self::UnknownUser => "username_404",
            Self::WrongPassword => "password_404",
            Self::TideExists => "tide_exists",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ALL.iter().copied().find(|r| r.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyBody => "A splash needs some text.",
            Self::BodyTooLong => "That splash is too long.",
            Self::TooManyTides => "Pick at most three tides.",
            Self::UnknownTide => "One of the chosen tides does not exist.",
            Self::MediaConflict => "Attach either a file or a link, not both.",
            Self::BadMediaLink => "Media links must start with http:// or https://.",
            Self::UnknownMedia => "The attached file was not found. Upload it again.",
            Self::BadUsername => "Usernames are 3 to 32 letters, digits, '-' or '_'.",
            Self::WeakPassword => "Passwords need at least 8 characters.",
            Self::BadTideName => "Tide names are 1 to 32 lower-case letters, digits or '-'.",
            Self::UsernameTaken => "Username is already taken. Please choose a different username.",
            Self::UnknownUser => "Username was not found. Are you sure you typed it correctly?",
            Self::WrongPassword => "Password is incorrect.",
            Self::TideExists => "That tide already exists.",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub fn validate_username(username: &str) -> Result<(), Rejection> {
    let len = username.chars().count();
    let charset_ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !USERNAME_CHARS.contains(&len) || !charset_ok {
        return Err(Rejection::BadUsername);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), Rejection> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(Rejection::WeakPassword);
    }
    Ok(())
}

/// Lower-cases and checks a new tide name.
pub fn normalize_tide_name(name: &str) -> Result<String, Rejection> {
    let name = name.trim().to_lowercase();
    let charset_ok = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !TIDE_NAME_CHARS.contains(&name.chars().count()) || !charset_ok {
        return Err(Rejection::BadTideName);
    }
    Ok(name)
}

/// A splash that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SplashDraft {
    pub body: String,
    pub tides: Vec<String>,
    pub media: Option<Media>,
}

/// Checks a submission against the current tide registry and classifies any
/// media link.
pub fn prepare_splash(
    req: &CreateSplashRequest,
    registry: &ScopeRegistry,
) -> Result<SplashDraft, CoreError> {
    let body = req.body.trim();
    if body.is_empty() {
        return Err(Rejection::EmptyBody.into());
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(Rejection::BodyTooLong.into());
    }

    let mut tides: Vec<String> = Vec::new();
    for tide in &req.tides {
        let tide = tide.trim().to_lowercase();
        if tide.is_empty() || tides.contains(&tide) {
            continue;
        }
        if !registry.has_tide(&tide) {
            return Err(Rejection::UnknownTide.into());
        }
        tides.push(tide);
    }
    if tides.len() > MAX_TIDES_PER_SPLASH {
        return Err(Rejection::TooManyTides.into());
    }

    let link = non_blank(req.media_link.as_deref());
    let file = non_blank(req.media_file.as_deref());
    let media = match (file, link) {
        (Some(_), Some(_)) => return Err(Rejection::MediaConflict.into()),
        (Some(file_id), None) => Some(Media::Upload {
            file_id: file_id.to_string(),
        }),
        (None, Some(url)) => {
            if !is_web_link(url) {
                return Err(Rejection::BadMediaLink.into());
            }
            Some(Media::Link {
                url: url.to_string(),
                embed: classify_media(url),
            })
        }
        (None, None) => None,
    };

    Ok(SplashDraft {
        body: body.to_string(),
        tides,
        media,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_web_link(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            !rest.is_empty()
                && !rest
                    .chars()
                    .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '`'))
        }
        None => false,
    }
}
