//! Tidewave core: id allocation, feed filtering, media link classification
//! and the HTML rendering helpers. Nothing in here performs I/O; storage is
//! reached through the [`allocator::IdLedger`] seam.

pub mod allocator;
pub mod error;
pub mod filter;
pub mod media;
pub mod render;
pub mod validate;

pub use allocator::{Allocator, IdLedger, InsertOutcome, allocate_and_insert};
pub use error::CoreError;
pub use filter::{ScopeRegistry, filter_splashes};
pub use media::{classify_media, embed_url};
pub use validate::Rejection;
