//! SQLite-backed storage for named cache generations.
//!
//! This module provides the persistent key-value store the agent caches
//! responses in, using SQLite with async access via tokio-rusqlite:
//!
//! - Named generations, created on demand and deleted as a whole
//! - Entries keyed by a SHA-256 digest of method and URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::Generation;
pub use generations::GenerationInfo;
