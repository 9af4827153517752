//! Clerk Admin library.
//!
//! This crate provides the web app as a library, allowing it to be tested
//! and reused by the CLI.
//!
//! # Authorization
//!
//! - Identities come from Clerk session tokens, verified locally
//! - Roles come from session claims, falling back to the Clerk Backend API
//! - Chat access is gated by per-user records in `PostgreSQL`
//!
//! Read-only checks fail closed; only admin mutations return errors.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clerk;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod gemini;
pub mod middleware;
pub mod models;
pub mod ports;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
