//! URL shortener auth server.
//!
//! Exposes `/login`, `/register`, `/refresh-token`, `/logout`, `/me` and
//! `/health` over axum. [`app::AppState`] is the composition root: it owns
//! the repositories and the [`urlshort_auth::AuthService`] built on them.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod routes;

pub use app::{AppState, SharedState, create_router};
pub use config::Cli;
pub use error::ApiError;
