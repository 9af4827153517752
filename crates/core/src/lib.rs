//! Clerk Admin Core - Shared types library.
//!
//! This crate provides common types used across all Clerk Admin components:
//! - `admin` - The web application (dashboard, chat, admin console)
//! - `cli` - Command-line tools for migrations and permission management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, roles, and resolution outcomes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
