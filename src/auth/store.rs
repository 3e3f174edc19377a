//! Process-wide bearer token cache.
//!
//! # Responsibilities
//! - Hold one token per repository code
//! - Writers racing on one key leave exactly one complete token behind
//!
//! # Design Decisions
//! - Plain mutex around a map; the lock is never held across a network call
//! - Constructed explicitly and shared via `Arc`, no hidden global
//! - A poisoned lock is recovered, since the map is always left consistent

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::token::BearerToken;

/// Concurrency-safe token cache keyed by repository code.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: Mutex<HashMap<String, BearerToken>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BearerToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached token for `key`, if any.
    pub fn get(&self, key: &str) -> Option<BearerToken> {
        self.lock().get(key).cloned()
    }

    /// Store `token`, replacing any previous value.
    pub fn add_or_replace(&self, key: &str, token: BearerToken) {
        self.lock().insert(key.to_string(), token);
    }

    /// Drop the token for `key`. Returns true if one was stored.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
