//! In-memory fakes and fixtures shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};

use clerk_admin_core::UserId;

use crate::clerk::ClerkError;
use crate::db::RepositoryError;
use crate::gemini::GeminiError;
use crate::models::{ChatPermission, Identity, PermissionGrant, SessionClaims, UserProfile};
use crate::ports::{GenerationBackend, IdentityProvider, PermissionStore};

pub const SESSION_PUBLIC_KEY: &str = include_str!("../fixtures/session_public_key.pem");
const SESSION_SIGNING_KEY: &str = include_str!("../fixtures/session_signing_key.pem");

/// Sign a session token with the fixture key. Adds `exp` one hour out unless set.
pub fn sign_session_token(claims: &serde_json::Value) -> String {
    let mut claims = claims.as_object().cloned().unwrap_or_default();
    claims
        .entry("exp")
        .or_insert_with(|| serde_json::json!(Utc::now().timestamp() + 3600));
    let key = EncodingKey::from_rsa_pem(SESSION_SIGNING_KEY.as_bytes()).unwrap();
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

/// Identity whose claims are the given JSON object.
pub fn identity(id: &str, claims: serde_json::Value) -> Identity {
    let claims: SessionClaims = claims.as_object().cloned().unwrap_or_default();
    Identity::new(user(id)).with_claims(claims)
}

// =============================================================================
// Identity provider
// =============================================================================

/// Identity provider returning a fixed profile and counting lookups.
#[derive(Default)]
pub struct FakeIdentityProvider {
    role: Option<String>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn with_role(role: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn fetch_profile(&self, _user_id: &UserId) -> Result<UserProfile, ClerkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClerkError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(UserProfile {
            private_role: self.role.clone(),
        })
    }
}

// =============================================================================
// Permission store
// =============================================================================

/// Permission store backed by a map, with upsert/revoke semantics matching Postgres.
#[derive(Default)]
pub struct InMemoryPermissionStore {
    rows: Mutex<BTreeMap<UserId, ChatPermission>>,
    fail: bool,
    reads: AtomicUsize,
}

impl InMemoryPermissionStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_permission(user_id: &str, enabled: bool) -> Self {
        let store = Self::default();
        let now = Utc::now();
        store.rows.lock().unwrap().insert(
            user(user_id),
            ChatPermission {
                user_id: user(user_id),
                enabled,
                granted_at: now,
                granted_by: None,
                notes: None,
                updated_at: now,
            },
        );
        store
    }

    pub fn rows(&self) -> Vec<ChatPermission> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn get_permission(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ChatPermission>, RepositoryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.rows.lock().unwrap().get(user_id).cloned())
    }

    async fn upsert_permission(
        &self,
        grant: &PermissionGrant,
    ) -> Result<ChatPermission, RepositoryError> {
        self.check()?;
        let record = ChatPermission {
            user_id: grant.user_id.clone(),
            enabled: true,
            granted_at: grant.at,
            granted_by: grant.granted_by.clone(),
            notes: grant.notes.clone(),
            updated_at: grant.at,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(grant.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn set_enabled(&self, user_id: &UserId, enabled: bool) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(user_id).is_some_and(|row| {
            row.enabled = enabled;
            row.updated_at = Utc::now();
            true
        }))
    }

    async fn list_permissions(&self) -> Result<Vec<ChatPermission>, RepositoryError> {
        self.check()?;
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.granted_at.cmp(&a.granted_at));
        Ok(rows)
    }
}

// =============================================================================
// Generation backend
// =============================================================================

/// Scripted outcome for one model.
#[derive(Clone)]
pub enum Outcome {
    Text(&'static str),
    Fail(&'static str),
}

/// Backend that answers per model from a script and records the call order.
#[derive(Default)]
pub struct ScriptedBackend {
    script: HashMap<String, Outcome>,
    invoked: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(script: &[(&str, Outcome)]) -> Self {
        Self {
            script: script
                .iter()
                .map(|(model, outcome)| ((*model).to_string(), outcome.clone()))
                .collect(),
            invoked: Mutex::new(Vec::new()),
        }
    }

    pub fn invoked(&self) -> Vec<String> {
        self.invoked.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn invoke(&self, model: &str, _prompt: &str) -> Result<String, GeminiError> {
        self.invoked.lock().unwrap().push(model.to_string());
        match self.script.get(model) {
            Some(Outcome::Text(text)) => Ok((*text).to_string()),
            Some(Outcome::Fail(message)) => Err(GeminiError::Api {
                status: 404,
                message: (*message).to_string(),
            }),
            None => Err(GeminiError::Api {
                status: 404,
                message: format!("models/{model} is not found"),
            }),
        }
    }
}
