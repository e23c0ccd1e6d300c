//! URL shortener core: domain models, wire DTOs and repository traits
//! shared by the auth, storage, client and server crates.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{CoreError, CoreResult};
