use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::{load_session, require_auth, require_session};
use crate::state::AppState;
use crate::{auth, feeds, media, pages, splashes, tides, users};

/// The full HTTP surface: HTML pages, the JSON API and media.
pub fn router(state: AppState) -> Router {
    let public_pages = Router::new()
        .route("/", get(|| async { Redirect::to("/home") }))
        .route("/home", get(feeds::home))
        .route("/tides", get(tides::tides_index))
        .route("/tides/{name}", get(feeds::tide_feed))
        .route("/users", get(users::users_index))
        .route("/users/{name}", get(feeds::user_profile))
        .route("/splashes/{id}", get(splashes::splash_page))
        .route("/sign-in", get(auth::sign_in_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/tos", get(pages::tos))
        .route("/health", get(pages::health))
        .route("/media/{file_id}", get(media::download_media));

    let session_pages = Router::new()
        .route("/make-a-splash", get(splashes::make_splash_page))
        .route("/splashes", post(splashes::create_splash))
        .route("/create-a-tide", get(tides::create_tide_page))
        .route("/tides", post(tides::create_tide))
        .route_layer(from_fn(require_session));

    let public_api = Router::new()
        .route("/api/auth/register", post(auth::api_register))
        .route("/api/auth/login", post(auth::api_login))
        .route("/api/splashes", get(feeds::api_list_splashes))
        .route("/api/tides", get(tides::api_list_tides));

    let protected_api = Router::new()
        .route("/api/splashes", post(splashes::api_create_splash))
        .route("/media", post(media::upload_media))
        .route_layer(from_fn(require_auth))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    Router::new()
        .merge(public_pages)
        .merge(session_pages)
        .merge(public_api)
        .merge(protected_api)
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), load_session))
        .with_state(state)
}
