use thiserror::Error;

use crate::validate::Rejection;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The persisted collection could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// No free id was confirmed within the walk distance or the insert
    /// retry budget. Transient; the caller may try again.
    #[error("could not allocate an id near {requested} after {attempts} attempt(s)")]
    AllocationRetryExhausted { requested: i64, attempts: u32 },

    /// A tide or author scope that names nothing known.
    #[error("unknown scope: {0}")]
    InvalidScope(String),

    #[error("rejected: {0}")]
    Rejected(Rejection),
}

impl From<Rejection> for CoreError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}
