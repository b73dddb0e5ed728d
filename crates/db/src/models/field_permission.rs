//! Field permission grant rows.

use serde::Serialize;
use sqlx::FromRow;
use tempo_core::permission::{FieldGrant, FieldRights};
use tempo_core::role::Role;
use tempo_core::types::{DbId, Timestamp};

/// A `(role, entity, field)` grant row from `field_permissions`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FieldPermission {
    pub id: DbId,
    pub role_id: i16,
    pub entity: String,
    pub field: String,
    pub can_view: bool,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
    /// Deprecated; kept in storage and the admin grid only.
    pub can_view_add_info: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FieldPermission {
    /// Project the row onto the core resolution input. Rows whose role id
    /// is no longer known are dropped (roles are fixed-but-extensible; an
    /// old id may linger in storage).
    pub fn to_grant(&self) -> Option<FieldGrant> {
        Some(FieldGrant {
            role: Role::from_id(self.role_id)?,
            field: self.field.clone(),
            rights: FieldRights {
                can_view: self.can_view,
                can_read: self.can_read,
                can_write: self.can_write,
                can_delete: self.can_delete,
                can_view_add_info: self.can_view_add_info,
            },
        })
    }
}
