use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// Session claims. `sub` is the user's current public id, which rotates on
/// every login, so older tokens stop resolving to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by the JSON register and login endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub username: String,
    pub token: String,
}

// -- Splashes --

/// Body of both the HTML form and the JSON endpoint. Checkbox forms send one
/// `tides` pair per checked box.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSplashRequest {
    pub body: String,
    #[serde(default)]
    pub tides: Vec<String>,
    #[serde(default)]
    pub media_link: Option<String>,
    #[serde(default)]
    pub media_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SplashQuery {
    pub tide: Option<String>,
    pub author: Option<String>,
}

// -- Tides --

#[derive(Debug, Deserialize)]
pub struct CreateTideRequest {
    pub name: String,
}

// -- Media --

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub size: u64,
}

// -- Pages --

/// `?error=<code>` carried back to a form after a rejected submission.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}
