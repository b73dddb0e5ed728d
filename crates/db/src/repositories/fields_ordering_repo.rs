//! Repository for the `fields_orderings` table (detail/card view field
//! order). Personal only; a save replaces every row for the (user, entity)
//! pair in one transaction.

use sqlx::PgPool;
use tempo_core::entity::Entity;
use tempo_core::types::DbId;

use crate::models::fields_ordering::FieldsOrdering;

const COLUMNS: &str = "id, user_id, entity, field, ordering, created_at";

/// Provides data access for personal field orderings.
pub struct FieldsOrderingRepo;

impl FieldsOrderingRepo {
    /// A user's field ordering for one entity, ascending.
    pub async fn list_for(
        pool: &PgPool,
        user_id: DbId,
        entity: Entity,
    ) -> Result<Vec<FieldsOrdering>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fields_orderings \
             WHERE user_id = $1 AND entity = $2 \
             ORDER BY ordering, field"
        );
        sqlx::query_as::<_, FieldsOrdering>(&query)
            .bind(user_id)
            .bind(entity.as_str())
            .fetch_all(pool)
            .await
    }

    /// Replace the full ordering for (user, entity): delete all existing
    /// rows, then insert the given (field, ordering) pairs. All-or-nothing.
    pub async fn replace_all(
        pool: &PgPool,
        user_id: DbId,
        entity: Entity,
        orderings: &[(String, i32)],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM fields_orderings WHERE user_id = $1 AND entity = $2")
            .bind(user_id)
            .bind(entity.as_str())
            .execute(&mut *tx)
            .await?;

        for (field, ordering) in orderings {
            sqlx::query(
                "INSERT INTO fields_orderings (user_id, entity, field, ordering) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(entity.as_str())
            .bind(field)
            .bind(ordering)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Full reset: delete every row for (user, entity).
    pub async fn reset(pool: &PgPool, user_id: DbId, entity: Entity) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fields_orderings WHERE user_id = $1 AND entity = $2")
            .bind(user_id)
            .bind(entity.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
