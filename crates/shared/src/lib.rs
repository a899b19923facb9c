//! Shared utilities and common types for SeaGuard.
//!
//! This crate provides functionality used across all other crates:
//! - Spherical geometry kernel (distances, point-in-polygon)
//! - Common validation logic
//! - Distance formatting for display

pub mod format;
pub mod geometry;
pub mod validation;

pub use geometry::Coordinate;
