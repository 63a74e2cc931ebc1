//! The logged-in user, read once at startup and handed to the controllers

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::store::KeyValueStore;

/// Key of the stored user item
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    Employee,
    Admin,
}

/// Stored user item: `{"type": "Employee", "email": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub email: String,
}

/// Explicit user context for one application run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn employee(email: impl Into<String>) -> Self {
        Self::new(User {
            kind: UserKind::Employee,
            email: email.into(),
        })
    }

    /// Load the session from the stored user item
    pub fn load(storage: &impl KeyValueStore) -> Result<Self, SessionError> {
        let raw = storage.get_item(USER_KEY)?.ok_or(SessionError::NoUser)?;
        let user: User = serde_json::from_str(&raw)?;
        Ok(Self::new(user))
    }

    /// Persist this session's user so later runs pick it up
    pub fn save(&self, storage: &impl KeyValueStore) -> Result<(), SessionError> {
        let raw = serde_json::to_string(&self.user)?;
        storage.set_item(USER_KEY, &raw)?;
        Ok(())
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}
