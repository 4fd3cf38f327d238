use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Name shown on a freshly created CV: the profile display name when set,
    /// otherwise the account username.
    pub fn preferred_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// The account an operation runs on behalf of. Threaded explicitly into every
/// CV operation; never read from ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub account_id: Uuid,
}

impl Owner {
    pub fn new(account_id: Uuid) -> Self {
        Self { account_id }
    }
}
