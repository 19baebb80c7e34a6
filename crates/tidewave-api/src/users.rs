use axum::{Extension, extract::State, response::Html};
use tidewave_db::models::UserRow;

use crate::error::{PageError, render};
use crate::middleware::Viewer;
use crate::state::{AppState, with_db};
use crate::views::{UserLink, UsersPage};

/// GET /users: everyone, alphabetical ignoring case.
pub async fn users_index(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Html<String>, PageError> {
    let users: Vec<_> = with_db(&state, |db| db.list_users())
        .await?
        .into_iter()
        .map(UserRow::into_user)
        .collect();

    render(&UsersPage {
        title: "Users".into(),
        current_user: viewer.username(),
        users: users.iter().map(UserLink::from).collect(),
    })
}
