//! Credential authority: registration, login and bearer-token identification
//! over HTTP, backed by SQLite.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::user;
pub use outbound::repositories;
