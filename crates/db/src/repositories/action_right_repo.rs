//! Repository for the `action_rights` table.

use sqlx::PgPool;
use tempo_core::role::Role;

use crate::models::action_right::ActionRight;

const COLUMNS: &str = "id, role_id, action, allowed, created_at, updated_at";

/// Provides data access for named coarse-grained action grants.
pub struct ActionRightRepo;

impl ActionRightRepo {
    /// List all grant rows for one action across all roles.
    pub async fn list_for_action(
        pool: &PgPool,
        action: &str,
    ) -> Result<Vec<ActionRight>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM action_rights WHERE action = $1");
        sqlx::query_as::<_, ActionRight>(&query)
            .bind(action)
            .fetch_all(pool)
            .await
    }

    /// List every action grant row, for the admin configuration screen.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ActionRight>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM action_rights ORDER BY action, role_id");
        sqlx::query_as::<_, ActionRight>(&query).fetch_all(pool).await
    }

    /// Upsert one (role, action) grant.
    pub async fn upsert(
        pool: &PgPool,
        role: Role,
        action: &str,
        allowed: bool,
    ) -> Result<ActionRight, sqlx::Error> {
        let query = format!(
            "INSERT INTO action_rights (role_id, action, allowed) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (role_id, action) \
             DO UPDATE SET allowed = EXCLUDED.allowed, updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActionRight>(&query)
            .bind(role.id())
            .bind(action)
            .bind(allowed)
            .fetch_one(pool)
            .await
    }
}
