//! Core types and storage for memento.
//!
//! This crate provides:
//! - The response store contract and its SQLite reference implementation
//! - Persistence policy (allowed status codes, allowed methods, TTL)
//! - Configuration structures
//! - Unified error types

pub mod config;
pub mod error;
pub mod policy;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use policy::{Policy, PolicyError};
pub use store::{RequestIdentity, ResponseStore, SqliteStore, StoredResponse};
