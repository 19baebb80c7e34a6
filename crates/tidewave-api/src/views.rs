//! Askama page templates and the view models they render.
//!
//! Every template extends `base.html`, which reads `title` and
//! `current_user`. Splash bodies and media arrive pre-rendered by
//! `tidewave_core::render` and are the only values marked `|safe`.

use askama::Template;
use axum::http::StatusCode;
use tidewave_core::render::{capitalize_words, format_date, format_timestamp, render_body, render_media};
use tidewave_types::models::{Splash, User};

/// A splash ready for display.
#[derive(Debug)]
pub struct SplashCard {
    pub id: i64,
    pub author: String,
    pub author_display: String,
    pub created: String,
    pub body_html: String,
    pub tides: Vec<TideLink>,
    pub media_html: Option<String>,
}

impl SplashCard {
    pub fn from_splash(splash: &Splash) -> Self {
        Self {
            id: splash.id,
            author: splash.author.clone(),
            author_display: capitalize_words(&splash.author),
            created: format_timestamp(&splash.created_at),
            body_html: render_body(&splash.body),
            tides: splash.tides.iter().map(|t| TideLink::new(t)).collect(),
            media_html: splash
                .media
                .as_ref()
                .map(|m| render_media(m, &splash.author, splash.id)),
        }
    }
}

#[derive(Debug)]
pub struct TideLink {
    pub name: String,
    pub display: String,
}

impl TideLink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display: capitalize_words(name),
        }
    }
}

#[derive(Debug)]
pub struct UserLink {
    pub name: String,
    pub display: String,
    pub joined: String,
}

impl From<&User> for UserLink {
    fn from(user: &User) -> Self {
        Self {
            name: user.username.clone(),
            display: capitalize_words(&user.username),
            joined: format_date(&user.joined_at),
        }
    }
}

/// Global, tide and profile feeds.
#[derive(Template)]
#[template(path = "feed.html")]
pub struct FeedPage {
    pub title: String,
    pub current_user: Option<String>,
    pub heading: String,
    pub subheading: Option<String>,
    pub splashes: Vec<SplashCard>,
}

#[derive(Template)]
#[template(path = "splash.html")]
pub struct SplashPage {
    pub title: String,
    pub current_user: Option<String>,
    pub card: SplashCard,
}

#[derive(Template)]
#[template(path = "tides.html")]
pub struct TidesPage {
    pub title: String,
    pub current_user: Option<String>,
    pub tides: Vec<TideLink>,
}

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersPage {
    pub title: String,
    pub current_user: Option<String>,
    pub users: Vec<UserLink>,
}

#[derive(Template)]
#[template(path = "make_splash.html")]
pub struct MakeSplashPage {
    pub title: String,
    pub current_user: Option<String>,
    pub tides: Vec<TideLink>,
    pub max_tides: usize,
    pub max_body: usize,
    pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "create_tide.html")]
pub struct CreateTidePage {
    pub title: String,
    pub current_user: Option<String>,
    pub error: Option<&'static str>,
}

/// Sign-up form.
#[derive(Template)]
#[template(path = "sign_in.html")]
pub struct SignInPage {
    pub title: String,
    pub current_user: Option<String>,
    pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub title: String,
    pub current_user: Option<String>,
    pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "tos.html")]
pub struct TosPage {
    pub title: String,
    pub current_user: Option<String>,
}

/// 404, 500 and the other error pages.
#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusPage {
    pub title: String,
    pub current_user: Option<String>,
    pub code: u16,
    pub message: &'static str,
}

impl StatusPage {
    pub fn new(status: StatusCode, current_user: Option<String>) -> Self {
        let message = match status {
            StatusCode::NOT_FOUND => "The page you are looking for has drifted away.",
            StatusCode::SERVICE_UNAVAILABLE => "The server is busy. Please try again.",
            s if s.is_server_error() => "Something went wrong on our side.",
            _ => "That request could not be handled.",
        };
        Self {
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            current_user,
            code: status.as_u16(),
            message,
        }
    }
}
