//! Users and login sessions for the web front-end

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "hallon_session";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("an account for {0} already exists")]
    EmailTaken(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    password_hash: String,
}

impl User {
    /// Hashes `password` with a fresh salt.
    pub fn new(name: &str, email: &str, password: &str) -> Result<Self, AuthError> {
        let name = name.trim();
        let email = email.trim().to_lowercase();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            password_hash,
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(hash) => Argon2::default()
                .verify_password(password.as_bytes(), &hash)
                .is_ok(),
            Err(e) => {
                tracing::error!(user_id = %self.id, error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }
}

/// The user behind a valid session cookie.
#[derive(Clone, Debug)]
pub struct LoggedIn {
    pub user: User,
    pub session_id: Uuid,
}

/// Where users live.
pub trait UserStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<User>;

    fn find(&self, id: Uuid) -> Option<User>;

    fn insert(&self, user: User) -> Result<User, AuthError>;
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn find_by_email(&self, email: &str) -> Option<User> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.values().find(|user| user.email == email).cloned()
    }

    fn find(&self, id: Uuid) -> Option<User> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.get(&id).cloned()
    }

    fn insert(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if users.values().any(|existing| existing.email == user.email) {
            return Err(AuthError::EmailTaken(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// Login sessions keyed by the id stored in the session cookie.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Uuid>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `user_id` and returns its id.
    pub fn persist(&self, user_id: Uuid) -> Uuid {
        let session_id = Uuid::new_v4();
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session_id, user_id);
        session_id
    }

    pub fn user_for(&self, session_id: Uuid) -> Option<Uuid> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&session_id)
            .copied()
    }

    pub fn clear(&self, session_id: Uuid) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&session_id)
            .is_some()
    }
}
