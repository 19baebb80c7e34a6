use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::Form;
use tidewave_core::validate::{MAX_BODY_CHARS, MAX_TIDES_PER_SPLASH, prepare_splash};
use tidewave_core::{CoreError, Rejection};
use tidewave_types::api::{CreateSplashRequest, ErrorQuery};
use tidewave_types::models::{Media, Splash};
use tracing::warn;

use crate::error::{PageError, error_message, rejection, render, status_for};
use crate::feeds::load_registry;
use crate::middleware::{Session, Viewer};
use crate::state::{AppState, with_db};
use crate::storage::is_valid_file_id;
use crate::views::{MakeSplashPage, SplashCard, SplashPage, TideLink};

/// GET /splashes/{id}
pub async fn splash_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let id: i64 = id.parse().map_err(|_| PageError(StatusCode::NOT_FOUND))?;
    let splash = with_db(&state, move |db| db.get_splash(id))
        .await?
        .ok_or(PageError(StatusCode::NOT_FOUND))?
        .into_splash();

    render(&SplashPage {
        title: format!("Splash {}", splash.id),
        current_user: viewer.username(),
        card: SplashCard::from_splash(&splash),
    })
}

/// GET /make-a-splash
pub async fn make_splash_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ErrorQuery>,
) -> Result<Html<String>, PageError> {
    let tides = with_db(&state, |db| db.list_tides()).await?;
    render(&MakeSplashPage {
        title: "Make a splash".into(),
        current_user: Some(session.username),
        tides: tides.iter().map(|t| TideLink::new(&t.name)).collect(),
        max_tides: MAX_TIDES_PER_SPLASH,
        max_body: MAX_BODY_CHARS,
        error: error_message(&query),
    })
}

/// POST /splashes: form submission, redirects to the new splash.
pub async fn create_splash(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(req): Form<CreateSplashRequest>,
) -> Result<Redirect, PageError> {
    match store_splash(&state, &session.username, req).await {
        Ok(splash) => Ok(Redirect::to(&format!("/splashes/{}", splash.id))),
        Err(e) => match rejection(&e) {
            Some(r) => Ok(Redirect::to(&format!("/make-a-splash?error={}", r.code()))),
            None => Err(e.into()),
        },
    }
}

/// POST /api/splashes
pub async fn api_create_splash(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateSplashRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let splash = store_splash(&state, &session.username, req)
        .await
        .map_err(|e| status_for(&e))?;
    Ok((StatusCode::CREATED, Json(splash)))
}

/// Validate, allocate an id and persist. Validation failures come back as
/// `CoreError::Rejected` inside the error.
async fn store_splash(state: &AppState, author: &str, req: CreateSplashRequest) -> anyhow::Result<Splash> {
    let registry = load_registry(state).await?;
    let draft = prepare_splash(&req, &registry)?;

    if let Some(Media::Upload { file_id }) = &draft.media {
        let known = is_valid_file_id(file_id) && {
            let id = file_id.clone();
            with_db(state, move |db| db.get_media_file(&id)).await?.is_some()
        };
        if !known {
            warn!("{} attached unknown media file {}", author, file_id);
            return Err(CoreError::from(Rejection::UnknownMedia).into());
        }
    }

    let allocator = state.allocator;
    let max_attempts = state.max_insert_attempts;
    let author = author.to_string();
    with_db(state, move |db| db.create_splash(&allocator, max_attempts, &author, draft)).await
}
