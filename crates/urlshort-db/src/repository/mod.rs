//! In-memory repository implementations.

mod session;
mod user;

pub use session::MemorySessionRepository;
pub use user::MemoryUserRepository;
