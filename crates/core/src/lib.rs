//! Core types and shared functionality for offcache.
//!
//! This crate provides:
//! - Request/response model exchanged between the agent and the network
//! - Generation-scoped cache storage with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use cache::{CacheDb, Generation, GenerationInfo};
pub use config::{AgentConfig, ConfigError};
pub use error::Error;
pub use request::{AgentRequest, CacheMode};
pub use response::{AgentResponse, ResponseType};
