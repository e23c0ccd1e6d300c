//! URL shortener storage: in-memory implementations of the core
//! repository traits.
//!
//! Durable storage is an external collaborator; these implementations
//! back the server binary and the test suites and honour the same
//! atomicity contract a database-backed one must (per-user
//! compare-and-swap of the session record).

mod error;
pub mod repository;

pub use error::DbError;
pub use repository::{MemorySessionRepository, MemoryUserRepository};
