use axum::{
    Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::{PageError, render};
use crate::middleware::Viewer;
use crate::views::{StatusPage, TosPage};

pub async fn tos(Extension(viewer): Extension<Viewer>) -> Result<Html<String>, PageError> {
    render(&TosPage {
        title: "Terms of service".into(),
        current_user: viewer.username(),
    })
}

pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unmatched routes.
pub async fn not_found(Extension(viewer): Extension<Viewer>) -> Response {
    match render(&StatusPage::new(StatusCode::NOT_FOUND, viewer.username())) {
        Ok(html) => (StatusCode::NOT_FOUND, html).into_response(),
        Err(e) => e.into_response(),
    }
}
