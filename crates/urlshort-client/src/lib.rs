//! URL shortener client: where the caller's session lives and how every
//! outbound request gets authenticated.
//!
//! - [`session`]: the [`ClientSessionStore`] trait and its in-memory,
//!   file-backed and cookie-backed realizations.
//! - [`api`]: HTTP calls to the auth endpoints.
//! - [`refresh`]: single-flight coordination of refresh-token rotation.
//! - [`gateway`]: [`AuthHttpClient`], which attaches the bearer token and
//!   recovers once from an expired access token.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod refresh;
pub mod session;

pub use api::AuthApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use gateway::AuthHttpClient;
pub use refresh::{RefreshCoordinator, RefreshProcedure};
pub use session::{ClientSession, ClientSessionStore};
