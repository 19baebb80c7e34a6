use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tidewave_core::validate::{validate_password, validate_username};
use tidewave_core::{CoreError, Rejection};
use tidewave_types::api::{AuthResponse, Claims, ErrorQuery, LoginRequest, RegisterRequest};
use tracing::info;
use uuid::Uuid;

use crate::error::{PageError, error_message, rejection, render, status_for};
use crate::middleware::{SESSION_COOKIE, Viewer};
use crate::state::{AppState, with_db};
use crate::views::{LoginPage, SignInPage};

const TOKEN_LIFETIME_DAYS: i64 = 30;

struct SignedIn {
    username: String,
    token: String,
}

// -- Pages --

pub async fn sign_in_page(
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<ErrorQuery>,
) -> Result<Html<String>, PageError> {
    render(&SignInPage {
        title: "Sign in".into(),
        current_user: viewer.username(),
        error: error_message(&query),
    })
}

pub async fn login_page(
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<ErrorQuery>,
) -> Result<Html<String>, PageError> {
    render(&LoginPage {
        title: "Log in".into(),
        current_user: viewer.username(),
        error: error_message(&query),
    })
}

/// POST /sign-in: create the account and start a session.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(req): Form<RegisterRequest>,
) -> Result<(CookieJar, Redirect), PageError> {
    match sign_up(&state, req).await {
        Ok(signed_in) => Ok((jar.add(session_cookie(signed_in.token)), Redirect::to("/home"))),
        Err(e) => match rejection(&e) {
            Some(r) => Ok((jar, Redirect::to(&format!("/sign-in?error={}", r.code())))),
            None => Err(e.into()),
        },
    }
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(req): Form<LoginRequest>,
) -> Result<(CookieJar, Redirect), PageError> {
    match log_in(&state, req).await {
        Ok(signed_in) => Ok((jar.add(session_cookie(signed_in.token)), Redirect::to("/home"))),
        Err(e) => match rejection(&e) {
            Some(r) => Ok((jar, Redirect::to(&format!("/login?error={}", r.code())))),
            None => Err(e.into()),
        },
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), Redirect::to("/home"))
}

// -- JSON --

pub async fn api_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let signed_in = sign_up(&state, req).await.map_err(|e| match rejection(&e) {
        Some(Rejection::UsernameTaken) => StatusCode::CONFLICT,
        Some(_) => StatusCode::BAD_REQUEST,
        None => status_for(&e),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            username: signed_in.username,
            token: signed_in.token,
        }),
    ))
}

pub async fn api_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let signed_in = log_in(&state, req).await.map_err(|e| match rejection(&e) {
        Some(_) => StatusCode::UNAUTHORIZED,
        None => status_for(&e),
    })?;

    Ok(Json(AuthResponse {
        username: signed_in.username,
        token: signed_in.token,
    }))
}

// -- Shared --

async fn sign_up(state: &AppState, req: RegisterRequest) -> anyhow::Result<SignedIn> {
    validate_username(&req.username).map_err(CoreError::from)?;
    validate_password(&req.password).map_err(CoreError::from)?;

    let password_hash = hash_password(&req.password)?;
    let public_id = Uuid::new_v4();

    let username = req.username.clone();
    let created = with_db(state, move |db| {
        db.create_user(&username, &public_id.to_string(), &password_hash)
    })
    .await?;
    if !created {
        return Err(CoreError::from(Rejection::UsernameTaken).into());
    }

    info!("User {} registered", req.username);
    let token = create_token(&state.jwt_secret, public_id, &req.username)?;
    Ok(SignedIn {
        username: req.username,
        token,
    })
}

/// Verify the password, then store a fresh hash and public id. Tokens issued
/// before this login stop resolving.
async fn log_in(state: &AppState, req: LoginRequest) -> anyhow::Result<SignedIn> {
    let username = req.username.clone();
    let user = with_db(state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(CoreError::from(Rejection::UnknownUser))?;

    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|e| anyhow!("Stored hash for {} unreadable: {}", user.username, e))?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(CoreError::from(Rejection::WrongPassword).into());
    }

    let password_hash = hash_password(&req.password)?;
    let public_id = Uuid::new_v4();
    let name = user.username.clone();
    with_db(state, move |db| {
        db.rotate_credentials(&name, &password_hash, &public_id.to_string())
    })
    .await?;

    info!("User {} logged in", user.username);
    let token = create_token(&state.jwt_secret, public_id, &user.username)?;
    Ok(SignedIn {
        username: user.username,
        token,
    })
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Password hashing failed: {}", e))
}

fn create_token(secret: &str, public_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: public_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
