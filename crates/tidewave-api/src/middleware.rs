use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tidewave_types::api::Claims;
use tracing::{debug, error};
use uuid::Uuid;

use crate::state::{AppState, with_db};

pub const SESSION_COOKIE: &str = "tidewave_session";

/// A signed-in user, resolved from a token whose `sub` still matches the
/// user's current public id.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub public_id: Uuid,
}

/// Inserted on every request by [`load_session`].
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Session>);

impl Viewer {
    pub fn username(&self) -> Option<String> {
        self.0.as_ref().map(|s| s.username.clone())
    }
}

/// Resolve the caller from a bearer token or the session cookie. Never
/// rejects; anonymous requests get `Viewer(None)`.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let token = bearer_token(&req).or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()));

    let session = match token {
        Some(token) => resolve(&state, &token).await,
        None => None,
    };

    req.extensions_mut().insert(Viewer(session));
    next.run(req).await
}

/// JSON routes: 401 unless signed in.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let session = signed_in(&req).ok_or(StatusCode::UNAUTHORIZED)?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// HTML routes: send anonymous visitors to the login page.
pub async fn require_session(mut req: Request, next: Next) -> Response {
    match signed_in(&req) {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

fn signed_in(req: &Request) -> Option<Session> {
    req.extensions()
        .get::<Viewer>()
        .and_then(|viewer| viewer.0.clone())
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn resolve(state: &AppState, token: &str) -> Option<Session> {
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!("Rejected session token: {}", e);
            return None;
        }
    };

    let public_id = claims.sub;
    let row = with_db(state, move |db| db.get_user_by_public_id(&public_id.to_string())).await;
    match row {
        Ok(Some(user)) => Some(Session {
            username: user.username,
            public_id,
        }),
        Ok(None) => {
            debug!("Token for {} no longer matches a public id", claims.username);
            None
        }
        Err(e) => {
            error!("Session lookup failed: {:#}", e);
            None
        }
    }
}
