//! Persistence layer for SeaGuard.
//!
//! This crate contains:
//! - The key-value storage primitive (file and in-memory backends)
//! - Entity definitions (stored JSON mappings)
//! - The alert history repository and its background writer

pub mod entities;
pub mod kv;
pub mod metrics;
pub mod repositories;
pub mod writer;
