use anyhow::Result;
use chrono::Utc;
use tidewave_core::validate::SplashDraft;
use tidewave_core::{Allocator, CoreError, IdLedger, InsertOutcome, allocate_and_insert};
use tidewave_types::models::Splash;
use tracing::info;

use crate::Database;

impl IdLedger for Database {
    fn is_taken(&self, id: i64) -> Result<bool, CoreError> {
        self.splash_id_taken(id)
            .map_err(|e| CoreError::StorageUnavailable(e.to_string()))
    }
}

impl Database {
    /// Allocate an id for a new splash and store it. The requested id is the
    /// current number of splashes.
    ///
    /// Errors carry a [`CoreError`] (`StorageUnavailable` or
    /// `AllocationRetryExhausted`) that callers can `downcast_ref`.
    pub fn create_splash(
        &self,
        allocator: &Allocator,
        max_attempts: u32,
        author: &str,
        draft: SplashDraft,
    ) -> Result<Splash> {
        let requested = self
            .count_splashes()
            .map_err(|e| CoreError::StorageUnavailable(e.to_string()))?;
        self.create_splash_near(allocator, max_attempts, requested, author, draft)
    }

    /// Same as [`Database::create_splash`] with an explicit starting id.
    pub fn create_splash_near(
        &self,
        allocator: &Allocator,
        max_attempts: u32,
        requested: i64,
        author: &str,
        draft: SplashDraft,
    ) -> Result<Splash> {
        let mut splash = Splash {
            id: requested,
            author: author.to_string(),
            created_at: Utc::now(),
            body: draft.body,
            tides: draft.tides,
            media: draft.media,
        };

        let id = allocate_and_insert(allocator, self, requested, max_attempts, |id| {
            splash.id = id;
            match self.insert_splash(&splash) {
                Ok(InsertOutcome::Inserted(())) => Ok(InsertOutcome::Inserted(id)),
                Ok(InsertOutcome::IdTaken) => Ok(InsertOutcome::IdTaken),
                Err(e) => Err(CoreError::StorageUnavailable(e.to_string())),
            }
        })?;

        splash.id = id;
        info!("Splash {} created by {}", id, author);
        Ok(splash)
    }
}
