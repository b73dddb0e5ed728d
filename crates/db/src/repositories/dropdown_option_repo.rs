//! Repository for the `dropdown_options` table.

use sqlx::PgPool;
use tempo_core::types::DbId;

use crate::models::dropdown::DropdownOption;

const COLUMNS: &str = "id, field_id, label, ordering, created_at, updated_at";

/// Provides data access for dropdown options.
pub struct DropdownOptionRepo;

impl DropdownOptionRepo {
    /// Find an option by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DropdownOption>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dropdown_options WHERE id = $1");
        sqlx::query_as::<_, DropdownOption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a field's options in display order.
    pub async fn list_for_field(
        pool: &PgPool,
        field_id: DbId,
    ) -> Result<Vec<DropdownOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dropdown_options WHERE field_id = $1 ORDER BY ordering, id"
        );
        sqlx::query_as::<_, DropdownOption>(&query)
            .bind(field_id)
            .fetch_all(pool)
            .await
    }

    /// Create an option at the end of the sequence (ordering = max+1).
    pub async fn create(
        pool: &PgPool,
        field_id: DbId,
        label: &str,
    ) -> Result<DropdownOption, sqlx::Error> {
        let query = format!(
            "INSERT INTO dropdown_options (field_id, label, ordering) \
             VALUES ($1, $2, \
                (SELECT COALESCE(MAX(ordering), 0) + 1 FROM dropdown_options WHERE field_id = $1)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DropdownOption>(&query)
            .bind(field_id)
            .bind(label)
            .fetch_one(pool)
            .await
    }

    /// Rename an option.
    pub async fn update_label(
        pool: &PgPool,
        id: DbId,
        label: &str,
    ) -> Result<Option<DropdownOption>, sqlx::Error> {
        let query = format!(
            "UPDATE dropdown_options SET label = $2, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DropdownOption>(&query)
            .bind(id)
            .bind(label)
            .fetch_optional(pool)
            .await
    }

    /// Delete an option and any selections pointing at it, transactionally.
    ///
    /// Returns `true` if the option existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM dropdown_selections WHERE option_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM dropdown_options WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the full ordering for a field: the given ids take positions
    /// 1..N. All-or-nothing; returns `false` (and rolls back) if any id
    /// does not belong to the field.
    pub async fn reorder(
        pool: &PgPool,
        field_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        for (position, option_id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE dropdown_options SET ordering = $3, updated_at = now() \
                 WHERE id = $1 AND field_id = $2",
            )
            .bind(option_id)
            .bind(field_id)
            .bind(position as i32 + 1)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Foreign or unknown option id: drop the transaction.
                return Ok(false);
            }
        }

        tx.commit().await?;
        Ok(true)
    }
}
