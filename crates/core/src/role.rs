//! Global roles and named coarse-grained actions.
//!
//! Role *assignment* is external to this crate: the `user_roles` table is
//! owned by the surrounding platform, and the engine only consumes the
//! resulting role set. Role ids must match the seed data in the
//! `user_roles` / `field_permissions` migrations.

use serde::{Deserialize, Serialize};

/// A global role. Users hold zero or more of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Officer,
    Head,
    Curator,
    Employee,
    Finance,
    AiChat,
}

impl Role {
    /// Stable integer id used in storage.
    pub fn id(self) -> i16 {
        match self {
            Self::Admin => 1,
            Self::Officer => 2,
            Self::Head => 3,
            Self::Curator => 4,
            Self::Employee => 5,
            Self::Finance => 6,
            Self::AiChat => 7,
        }
    }

    /// Look up a role by its stored integer id.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Admin),
            2 => Some(Self::Officer),
            3 => Some(Self::Head),
            4 => Some(Self::Curator),
            5 => Some(Self::Employee),
            6 => Some(Self::Finance),
            7 => Some(Self::AiChat),
            _ => None,
        }
    }

    /// All roles, in id order. Used by the permission matrix screen.
    pub fn all() -> &'static [Role] {
        &[
            Self::Admin,
            Self::Officer,
            Self::Head,
            Self::Curator,
            Self::Employee,
            Self::Finance,
            Self::AiChat,
        ]
    }

    /// Machine-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Officer => "officer",
            Self::Head => "head",
            Self::Curator => "curator",
            Self::Employee => "employee",
            Self::Finance => "finance",
            Self::AiChat => "ai_chat",
        }
    }
}

/* --------------------------------------------------------------------------
Well-known action names
-------------------------------------------------------------------------- */

pub const ACTION_CAN_CREATE_PROJECTS: &str = "can_create_projects";
pub const ACTION_CAN_CREATE_TEAMS: &str = "can_create_teams";
pub const ACTION_CAN_CREATE_PAYMENTS: &str = "can_create_payments";
pub const ACTION_CAN_MANAGE_USERS: &str = "can_manage_users";
pub const ACTION_CAN_EXPORT_REPORTS: &str = "can_export_reports";
