//! Per-field permission resolution.
//!
//! Closed-world, deny-by-default: the absence of a grant row is
//! indistinguishable from an explicit denial, and resolution never fails.
//! A right is granted when *any* of the caller's roles grants it (union
//! semantics).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{is_bookkeeping_field, FieldDef};
use crate::error::CoreError;
use crate::role::Role;

/// One of the four per-field rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRight {
    View,
    Read,
    Write,
    Delete,
}

impl FieldRight {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "view" => Ok(Self::View),
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            other => Err(CoreError::Validation(format!(
                "Unknown right '{other}'. Must be one of: view, read, write, delete"
            ))),
        }
    }
}

/// The stored rights of one (role, entity, field) grant row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRights {
    pub can_view: bool,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
    /// Deprecated; stored and surfaced for the admin grid, never consulted
    /// by resolution.
    #[serde(default)]
    pub can_view_add_info: bool,
}

impl FieldRights {
    /// Apply the cascade invariant: write implies read and view; delete
    /// implies write, read and view. Applied at save time only — stored
    /// rows are trusted as-is on read.
    pub fn normalized(mut self) -> Self {
        if self.can_delete {
            self.can_write = true;
        }
        if self.can_write {
            self.can_read = true;
            self.can_view = true;
        }
        self
    }

    pub fn get(&self, right: FieldRight) -> bool {
        match right {
            FieldRight::View => self.can_view,
            FieldRight::Read => self.can_read,
            FieldRight::Write => self.can_write,
            FieldRight::Delete => self.can_delete,
        }
    }
}

/// A loaded grant row for some entity.
#[derive(Debug, Clone)]
pub struct FieldGrant {
    pub role: Role,
    pub field: String,
    pub rights: FieldRights,
}

/// A field participating in resolution: a static `FieldDef` or a dynamic
/// field projected onto its column key.
#[derive(Debug, Clone)]
pub struct ResolvableField {
    pub key: String,
    pub requires_permission: bool,
}

impl From<&FieldDef> for ResolvableField {
    fn from(def: &FieldDef) -> Self {
        Self {
            key: def.name.clone(),
            requires_permission: def.requires_permission,
        }
    }
}

/// Resolve one right across a role set for every field.
///
/// Fields not flagged `requires_permission` are granted unconditionally;
/// flagged fields are granted iff any held role has a stored `true` for the
/// requested right. Bookkeeping fields never appear in the result.
pub fn resolve_field_rights(
    fields: &[ResolvableField],
    grants: &[FieldGrant],
    roles: &[Role],
    right: FieldRight,
) -> BTreeMap<String, bool> {
    let mut result = BTreeMap::new();

    for field in fields {
        if is_bookkeeping_field(&field.key) {
            continue;
        }

        let allowed = if field.requires_permission {
            grants.iter().any(|g| {
                roles.contains(&g.role) && g.field == field.key && g.rights.get(right)
            })
        } else {
            true
        };

        result.insert(field.key.clone(), allowed);
    }

    result
}

/// A loaded (role, action) grant row.
#[derive(Debug, Clone)]
pub struct ActionGrant {
    pub role: Role,
    pub action: String,
    pub allowed: bool,
}

/// Resolve a named coarse-grained action: true iff any held role has an
/// explicit `true` grant. Deny-by-default.
pub fn resolve_action_right(grants: &[ActionGrant], roles: &[Role], action: &str) -> bool {
    grants
        .iter()
        .any(|g| roles.contains(&g.role) && g.action == action && g.allowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(key: &str, requires_permission: bool) -> ResolvableField {
        ResolvableField {
            key: key.to_string(),
            requires_permission,
        }
    }

    fn grant(role: Role, field: &str, rights: FieldRights) -> FieldGrant {
        FieldGrant {
            role,
            field: field.to_string(),
            rights,
        }
    }

    fn read_only() -> FieldRights {
        FieldRights {
            can_view: true,
            can_read: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_union_across_roles() {
        let fields = vec![field("salary", true)];
        let grants = vec![
            grant(Role::Employee, "salary", FieldRights::default()),
            grant(Role::Finance, "salary", read_only()),
        ];

        // Finance alone grants read; holding it alongside a denied role
        // still grants.
        let rights = resolve_field_rights(
            &fields,
            &grants,
            &[Role::Employee, Role::Finance],
            FieldRight::Read,
        );
        assert_eq!(rights["salary"], true);

        let rights =
            resolve_field_rights(&fields, &grants, &[Role::Employee], FieldRight::Read);
        assert_eq!(rights["salary"], false);
    }

    #[test]
    fn test_empty_role_set_denies_flagged_fields() {
        let fields = vec![field("salary", true)];
        let grants = vec![grant(Role::Finance, "salary", read_only())];
        let rights = resolve_field_rights(&fields, &grants, &[], FieldRight::Read);
        assert_eq!(rights["salary"], false);
    }

    #[test]
    fn test_missing_grant_is_denial() {
        let fields = vec![field("salary", true)];
        let rights = resolve_field_rights(&fields, &[], &[Role::Admin], FieldRight::Read);
        assert_eq!(rights["salary"], false);
    }

    #[test]
    fn test_unflagged_fields_default_true() {
        let fields = vec![field("name", false)];
        let rights = resolve_field_rights(&fields, &[], &[], FieldRight::Write);
        assert_eq!(rights["name"], true);
    }

    #[test]
    fn test_bookkeeping_fields_excluded() {
        let fields = vec![field("id", false), field("deleted", true), field("name", false)];
        let rights = resolve_field_rights(&fields, &[], &[Role::Admin], FieldRight::Read);
        assert_eq!(rights.len(), 1);
        assert!(rights.contains_key("name"));
    }

    #[test]
    fn test_write_cascade() {
        let rights = FieldRights {
            can_write: true,
            ..Default::default()
        }
        .normalized();
        assert!(rights.can_view && rights.can_read && rights.can_write);
        assert!(!rights.can_delete);
    }

    #[test]
    fn test_delete_cascade() {
        let rights = FieldRights {
            can_delete: true,
            ..Default::default()
        }
        .normalized();
        assert!(rights.can_view && rights.can_read && rights.can_write && rights.can_delete);
    }

    #[test]
    fn test_action_rights_deny_by_default() {
        let grants = vec![ActionGrant {
            role: Role::Head,
            action: "can_create_projects".into(),
            allowed: true,
        }];

        assert!(resolve_action_right(
            &grants,
            &[Role::Head, Role::Employee],
            "can_create_projects"
        ));
        assert!(!resolve_action_right(
            &grants,
            &[Role::Employee],
            "can_create_projects"
        ));
        assert!(!resolve_action_right(&grants, &[], "can_create_projects"));
        assert!(!resolve_action_right(
            &grants,
            &[Role::Head],
            "can_create_teams"
        ));
    }

    #[test]
    fn test_explicit_false_grant_does_not_override_another_roles_true() {
        let fields = vec![field("amount", true)];
        let grants = vec![
            grant(Role::Curator, "amount", FieldRights::default()),
            grant(Role::Admin, "amount", read_only()),
        ];
        let rights = resolve_field_rights(
            &fields,
            &grants,
            &[Role::Curator, Role::Admin],
            FieldRight::Read,
        );
        assert_eq!(rights["amount"], true);
    }
}
