//! User domain model and the identity carried inside access tokens.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Account type. Serialized exactly as `"Admin"` / `"Regular"`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    #[default]
    Regular,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Regular => "Regular",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Regular" => Ok(Role::Regular),
            other => Err(CoreError::validation(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
    /// Argon2id PHC string. Never leaves the server.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity this user presents inside an access token.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            display_name: self.nickname.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub nickname: String,
    /// Already hashed; repositories never see plaintext passwords.
    pub password_hash: String,
    pub role: Role,
}

/// Who a token speaks for. Immutable once minted into a token; the user
/// store stays the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        assert_eq!(serde_json::to_string(&Role::Regular).unwrap(), "\"Regular\"");
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn identity_uses_nickname_as_display_name() {
        let user = User {
            id: Uuid::new_v4(),
            username: "admin".into(),
            nickname: "The Admin".into(),
            password_hash: String::new(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let identity = user.identity();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.display_name, "The Admin");
        assert_eq!(identity.role, Role::Admin);
    }
}
