//! Domain models for the auth subsystem.
//!
//! `user` and `session` describe server-side state; `token` holds the
//! JSON bodies exchanged over the wire.

pub mod session;
pub mod token;
pub mod user;
