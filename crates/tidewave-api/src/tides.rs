use axum::{
    Extension, Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use tidewave_core::Rejection;
use tidewave_core::validate::normalize_tide_name;
use tidewave_db::models::TideRow;
use tidewave_types::api::{CreateTideRequest, ErrorQuery};
use tidewave_types::models::Tide;
use tracing::info;

use crate::error::{PageError, error_message, render, status_for};
use crate::middleware::{Session, Viewer};
use crate::state::{AppState, with_db};
use crate::views::{CreateTidePage, TideLink, TidesPage};

/// GET /tides
pub async fn tides_index(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Html<String>, PageError> {
    let tides = with_db(&state, |db| db.list_tides()).await?;
    render(&TidesPage {
        title: "Tides".into(),
        current_user: viewer.username(),
        tides: tides.iter().map(|t| TideLink::new(&t.name)).collect(),
    })
}

/// GET /create-a-tide
pub async fn create_tide_page(
    Extension(session): Extension<Session>,
    Query(query): Query<ErrorQuery>,
) -> Result<Html<String>, PageError> {
    render(&CreateTidePage {
        title: "Create a tide".into(),
        current_user: Some(session.username),
        error: error_message(&query),
    })
}

/// POST /tides
pub async fn create_tide(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(req): Form<CreateTideRequest>,
) -> Result<Redirect, PageError> {
    let name = match normalize_tide_name(&req.name) {
        Ok(name) => name,
        Err(r) => return Ok(reject(r)),
    };

    let added_name = name.clone();
    let added = with_db(&state, move |db| db.add_tide(&added_name)).await?;
    if !added {
        return Ok(reject(Rejection::TideExists));
    }

    info!("Tide {} created by {}", name, session.username);
    Ok(Redirect::to(&format!("/tides/{}", name)))
}

/// GET /api/tides
pub async fn api_list_tides(State(state): State<AppState>) -> Result<Json<Vec<Tide>>, StatusCode> {
    let tides = with_db(&state, |db| db.list_tides())
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(tides.into_iter().map(TideRow::into_tide).collect()))
}

fn reject(r: Rejection) -> Redirect {
    Redirect::to(&format!("/create-a-tide?error={}", r.code()))
}
