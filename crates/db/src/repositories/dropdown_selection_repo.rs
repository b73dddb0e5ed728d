//! Repository for the `dropdown_selections` table.
//!
//! Saving is always replace-all: delete every selection for the
//! (field, record) pair, then insert the new set, in one transaction.
//! Single-select fields therefore keep at most one row without needing a
//! uniqueness constraint.

use sqlx::PgPool;
use tempo_core::types::DbId;

use crate::models::dropdown::DropdownSelection;

const COLUMNS: &str = "id, field_id, record_id, option_id, created_at";

/// Provides data access for dropdown selections.
pub struct DropdownSelectionRepo;

impl DropdownSelectionRepo {
    /// All selections for one record, across fields.
    pub async fn list_for_record(
        pool: &PgPool,
        record_id: DbId,
    ) -> Result<Vec<DropdownSelection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dropdown_selections WHERE record_id = $1 ORDER BY field_id, id"
        );
        sqlx::query_as::<_, DropdownSelection>(&query)
            .bind(record_id)
            .fetch_all(pool)
            .await
    }

    /// The selections for one (field, record) pair.
    pub async fn list_for_field_record(
        pool: &PgPool,
        field_id: DbId,
        record_id: DbId,
    ) -> Result<Vec<DropdownSelection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dropdown_selections \
             WHERE field_id = $1 AND record_id = $2 ORDER BY id"
        );
        sqlx::query_as::<_, DropdownSelection>(&query)
            .bind(field_id)
            .bind(record_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the selection set for one (field, record): delete all, then
    /// insert the new option ids. An empty set clears the value.
    pub async fn replace_all(
        pool: &PgPool,
        field_id: DbId,
        record_id: DbId,
        option_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM dropdown_selections WHERE field_id = $1 AND record_id = $2")
            .bind(field_id)
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        for option_id in option_ids {
            sqlx::query(
                "INSERT INTO dropdown_selections (field_id, record_id, option_id) \
                 VALUES ($1, $2, $3)",
            )
            .bind(field_id)
            .bind(record_id)
            .bind(option_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}
