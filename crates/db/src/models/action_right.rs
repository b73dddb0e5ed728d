//! Coarse-grained named action grant rows.

use serde::Serialize;
use sqlx::FromRow;
use tempo_core::permission::ActionGrant;
use tempo_core::role::Role;
use tempo_core::types::{DbId, Timestamp};

/// A `(role, action)` grant row from `action_rights`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActionRight {
    pub id: DbId,
    pub role_id: i16,
    pub action: String,
    pub allowed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ActionRight {
    pub fn to_grant(&self) -> Option<ActionGrant> {
        Some(ActionGrant {
            role: Role::from_id(self.role_id)?,
            action: self.action.clone(),
            allowed: self.allowed,
        })
    }
}
