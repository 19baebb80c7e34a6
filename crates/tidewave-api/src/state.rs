use std::sync::Arc;

use anyhow::anyhow;
use tidewave_core::Allocator;
use tidewave_db::Database;

use crate::storage::Storage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub storage: Storage,
    pub jwt_secret: String,
    pub allocator: Allocator,
    /// Allocate+insert restarts allowed when a concurrent writer wins an id.
    pub max_insert_attempts: u32,
    pub max_upload_bytes: usize,
}

/// Run blocking database work off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))?
}
