//! Core types for Clerk Admin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod resolution;
pub mod role;

pub use id::*;
pub use resolution::Resolution;
pub use role::Role;
