use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::error::CoreError;

pub const DEFAULT_MAX_DISTANCE: u64 = 1024;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Read-only view of which splash ids are already in use.
pub trait IdLedger {
    fn is_taken(&self, id: i64) -> Result<bool, CoreError>;
}

impl IdLedger for BTreeSet<i64> {
    fn is_taken(&self, id: i64) -> Result<bool, CoreError> {
        Ok(self.contains(&id))
    }
}

impl IdLedger for HashSet<i64> {
    fn is_taken(&self, id: i64) -> Result<bool, CoreError> {
        Ok(self.contains(&id))
    }
}

/// Result of trying to persist a record under an allocated id.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    Inserted(T),
    /// Another writer committed the same id first.
    IdTaken,
}

/// Nearest-free-integer search over an [`IdLedger`].
#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    max_distance: u64,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE)
    }
}

impl Allocator {
    pub fn new(max_distance: u64) -> Self {
        Self { max_distance }
    }

    pub fn max_distance(&self) -> u64 {
        self.max_distance
    }

    /// Returns `requested` if it is free, otherwise the closest free id found
    /// by walking backward and forward one step at a time. Backward wins at
    /// equal distance. Ids below zero are not skipped.
    ///
    /// The answer is advisory: a concurrent writer can take the id before the
    /// caller inserts. See [`allocate_and_insert`].
    pub fn allocate<L>(&self, ledger: &L, requested: i64) -> Result<i64, CoreError>
    where
        L: IdLedger + ?Sized,
    {
        if !ledger.is_taken(requested)? {
            return Ok(requested);
        }

        for step in 1..=self.max_distance {
            let Ok(step) = i64::try_from(step) else {
                break;
            };

            let backward = requested.checked_sub(step);
            let forward = requested.checked_add(step);
            if backward.is_none() && forward.is_none() {
                break;
            }

            for candidate in [backward, forward].into_iter().flatten() {
                if !ledger.is_taken(candidate)? {
                    debug!("Allocated id {} for requested {} at distance {}", candidate, requested, step);
                    return Ok(candidate);
                }
            }
        }

        Err(CoreError::AllocationRetryExhausted {
            requested,
            attempts: 1,
        })
    }
}

/// Allocate an id and hand it to `insert`. When `insert` reports that the id
/// was taken in the meantime, the whole allocate+insert sequence restarts, at
/// most `max_attempts` times in total.
pub fn allocate_and_insert<L, T, F>(
    allocator: &Allocator,
    ledger: &L,
    requested: i64,
    max_attempts: u32,
    mut insert: F,
) -> Result<T, CoreError>
where
    L: IdLedger + ?Sized,
    F: FnMut(i64) -> Result<InsertOutcome<T>, CoreError>,
{
    for attempt in 1..=max_attempts {
        let id = allocator.allocate(ledger, requested)?;
        match insert(id)? {
            InsertOutcome::Inserted(value) => return Ok(value),
            InsertOutcome::IdTaken => {
                warn!("Id {} was taken before insert (attempt {}/{})", id, attempt, max_attempts);
            }
        }
    }

    Err(CoreError::AllocationRetryExhausted {
        requested,
        attempts: max_attempts,
    })
}
