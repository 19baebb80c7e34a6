//! HTML helpers for user-supplied text and media.
//!
//! Escaping and linkification are two separate passes over a token list:
//! the body is split into text and URL segments first, only then is each
//! segment turned into markup.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tidewave_types::models::Media;

use crate::media::embed_url;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'`]+"#).expect("valid url pattern"));

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Url(&'a str),
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Split `input` into literal text and `http(s)://` links. Sentence
/// punctuation directly after a link stays with the text.
pub fn tokenize(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in URL_PATTERN.find_iter(input) {
        let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if url.ends_with("://") {
            continue;
        }
        if m.start() > last {
            segments.push(Segment::Text(&input[last..m.start()]));
        }
        segments.push(Segment::Url(url));
        last = m.start() + url.len();
    }

    if last < input.len() {
        segments.push(Segment::Text(&input[last..]));
    }
    segments
}

/// Escaped body text with links wrapped in anchors.
pub fn render_body(input: &str) -> String {
    tokenize(input)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => escape_html(text),
            // The URL character class already excludes < > " ' and `,
            // so escaping only serializes '&'.
            Segment::Url(url) => {
                let url = escape_html(url);
                format!(r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#)
            }
        })
        .collect()
}

/// Markup for a splash's media container.
pub fn render_media(media: &Media, author: &str, splash_id: i64) -> String {
    let alt = escape_html(&format!("{author}'s media for splash: {splash_id}"));
    let inner = match media {
        Media::Upload { file_id } => {
            format!(r#"<img src="/media/{}" alt="{alt}">"#, escape_html(file_id))
        }
        Media::Link { url, embed } => {
            let url_attr = escape_html(url);
            if let Some(src) = embed.as_ref().and_then(embed_url) {
                format!(
                    r#"<iframe class="media-player" src="{}" title="Media Viewer" allowfullscreen frameborder="0" allow="accelerometer; clipboard-write; encrypted-media; picture-in-picture; web-share"></iframe>"#,
                    escape_html(&src)
                )
            } else if is_image_link(url) {
                format!(r#"<img src="{url_attr}" alt="{alt}">"#)
            } else {
                format!(r#"<a href="{url_attr}" target="_blank" rel="noopener noreferrer">{url_attr}</a>"#)
            }
        }
    };
    format!(r#"<div class="media-container">{inner}</div>"#)
}

fn is_image_link(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Upper-case the first letter of the input and of every word that follows
/// whitespace, `-` or `_`.
pub fn capitalize_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut boundary = true;
    for c in input.chars() {
        if boundary && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        boundary = c.is_whitespace() || c == '-' || c == '_';
    }
    out
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `YYYY-MM-DD`
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
