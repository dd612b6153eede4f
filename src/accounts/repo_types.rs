use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::password;

/// Account record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(rename = "email_address")]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    pub admin: bool,
    pub primary: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Account {
    /// True only for the exact password this account was created or last updated with.
    /// An empty or unparsable stored hash never matches but still costs one Argon2 run.
    pub fn has_password(&self, candidate: &str) -> bool {
        if self.password_hash.is_empty() {
            password::verify_dummy(candidate);
            return false;
        }
        match password::verify_password(candidate, &self.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(user_id = %self.id, error = %e, "stored password hash unusable");
                password::verify_dummy(candidate);
                false
            }
        }
    }
}

/// Validated row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Validated full replacement of the mutable profile columns.
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}
