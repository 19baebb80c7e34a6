use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use tidewave_core::render::{capitalize_words, format_date};
use tidewave_core::{ScopeRegistry, filter_splashes};
use tidewave_db::models::SplashRow;
use tidewave_types::api::SplashQuery;
use tidewave_types::models::{Scope, Splash};

use crate::error::{PageError, render, status_for};
use crate::middleware::Viewer;
use crate::state::{AppState, with_db};
use crate::views::{FeedPage, SplashCard};

/// Every splash plus the names a scope may refer to.
pub(crate) struct Snapshot {
    pub splashes: Vec<Splash>,
    pub registry: ScopeRegistry,
}

pub(crate) async fn load_registry(state: &AppState) -> anyhow::Result<ScopeRegistry> {
    with_db(state, |db| {
        let tides = db.list_tides()?.into_iter().map(|t| t.name).collect();
        let authors = db.list_users()?.into_iter().map(|u| u.username).collect();
        Ok(ScopeRegistry::new(tides, authors))
    })
    .await
}

pub(crate) async fn load_snapshot(state: &AppState) -> anyhow::Result<Snapshot> {
    let registry = load_registry(state).await?;
    let splashes: Vec<Splash> = with_db(state, |db| {
        Ok(db
            .list_splashes()?
            .into_iter()
            .map(SplashRow::into_splash)
            .collect())
    })
    .await?;
    Ok(Snapshot { splashes, registry })
}

/// GET /home
pub async fn home(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Html<String>, PageError> {
    let snapshot = load_snapshot(&state).await?;
    let splashes = filter_splashes(&snapshot.splashes, &Scope::Global, &snapshot.registry);
    render(&FeedPage {
        title: "Global".into(),
        current_user: viewer.username(),
        heading: "Global".into(),
        subheading: None,
        splashes: splashes.iter().map(SplashCard::from_splash).collect(),
    })
}

/// GET /tides/{name}
pub async fn tide_feed(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(name): Path<String>,
) -> Result<Html<String>, PageError> {
    let snapshot = load_snapshot(&state).await?;
    let scope = Scope::Tide(name.to_lowercase());
    snapshot
        .registry
        .validate(&scope)
        .map_err(|e| PageError::from(anyhow::Error::from(e)))?;

    let splashes = filter_splashes(&snapshot.splashes, &scope, &snapshot.registry);
    render(&FeedPage {
        title: "Tide".into(),
        current_user: viewer.username(),
        heading: capitalize_words(&name.to_lowercase()),
        subheading: None,
        splashes: splashes.iter().map(SplashCard::from_splash).collect(),
    })
}

/// GET /users/{name}
pub async fn user_profile(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(name): Path<String>,
) -> Result<Html<String>, PageError> {
    let lookup = name.clone();
    let user = with_db(&state, move |db| db.get_user_by_username(&lookup))
        .await?
        .ok_or(PageError(StatusCode::NOT_FOUND))?
        .into_user();

    let snapshot = load_snapshot(&state).await?;
    let splashes = filter_splashes(
        &snapshot.splashes,
        &Scope::Author(user.username.clone()),
        &snapshot.registry,
    );
    render(&FeedPage {
        title: "Profile".into(),
        current_user: viewer.username(),
        heading: capitalize_words(&user.username),
        subheading: Some(format!("Joined {}", format_date(&user.joined_at))),
        splashes: splashes.iter().map(SplashCard::from_splash).collect(),
    })
}

/// GET /api/splashes?tide=…|author=…
///
/// An unknown tide or author yields the unfiltered feed, matching
/// [`filter_splashes`].
pub async fn api_list_splashes(
    State(state): State<AppState>,
    Query(query): Query<SplashQuery>,
) -> Result<Json<Vec<Splash>>, StatusCode> {
    let snapshot = load_snapshot(&state).await.map_err(|e| status_for(&e))?;
    let scope = match (query.tide, query.author) {
        (Some(tide), _) => Scope::Tide(tide),
        (None, Some(author)) => Scope::Author(author),
        (None, None) => Scope::Global,
    };
    Ok(Json(filter_splashes(&snapshot.splashes, &scope, &snapshot.registry)))
}
