//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Role resolution and chat permission checks
//! - `chat` - Chat message validation and answering
//! - `generation` - Ordered model fallback for text generation
//! - `permissions` - Admin-only chat permission management

pub mod auth;
pub mod chat;
pub mod generation;
pub mod permissions;

pub use auth::{AdminIdentity, AuthError, RoleResolver};
pub use chat::{ChatError, ChatService, MAX_MESSAGE_LENGTH, SendMessageResult};
pub use generation::{FallbackClient, GenerationError, GenerationResponse};
pub use permissions::{ChatPermissionService, PermissionAdminError};
