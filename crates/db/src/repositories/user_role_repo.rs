//! Role provider: which global roles a user holds.
//!
//! Role assignment is owned by the surrounding platform; this repo only
//! reads the `user_roles` table. Stored role ids that no longer map to a
//! known role are skipped.

use sqlx::PgPool;
use tempo_core::role::Role;
use tempo_core::types::DbId;

pub struct UserRoleRepo;

impl UserRoleRepo {
    /// The set of roles held by a user. Empty for unknown users.
    pub async fn roles_of(pool: &PgPool, user_id: DbId) -> Result<Vec<Role>, sqlx::Error> {
        let rows: Vec<(i16,)> =
            sqlx::query_as("SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id")
                .bind(user_id)
                .fetch_all(pool)
                .await?;

        Ok(rows.into_iter().filter_map(|(id,)| Role::from_id(id)).collect())
    }

    /// Assign a role to a user (idempotent). Used by tests and seeding;
    /// the production assignment flow lives upstream.
    pub async fn assign(pool: &PgPool, user_id: DbId, role: Role) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role.id())
        .execute(pool)
        .await?;
        Ok(())
    }
}
