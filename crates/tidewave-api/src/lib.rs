pub mod auth;
pub mod error;
pub mod feeds;
pub mod media;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod splashes;
pub mod state;
pub mod storage;
pub mod tides;
pub mod users;
pub mod views;

pub use routes::router;
pub use state::{AppState, AppStateInner};
