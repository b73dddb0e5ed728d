//! Repository for the `dynamic_fields` table.

use sqlx::PgPool;
use tempo_core::entity::Entity;
use tempo_core::types::DbId;

use crate::models::dynamic_field::{CreateDynamicField, DynamicField, UpdateDynamicField};

const COLUMNS: &str = "id, entity, title, field_type, required, multiple, created_at, updated_at";

/// Provides data access for administrator-defined dynamic fields.
pub struct DynamicFieldRepo;

impl DynamicFieldRepo {
    /// Find a dynamic field by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DynamicField>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dynamic_fields WHERE id = $1");
        sqlx::query_as::<_, DynamicField>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all dynamic fields declared for an entity, in declaration order.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity: Entity,
    ) -> Result<Vec<DynamicField>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dynamic_fields WHERE entity = $1 ORDER BY id");
        sqlx::query_as::<_, DynamicField>(&query)
            .bind(entity.as_str())
            .fetch_all(pool)
            .await
    }

    /// Create a new dynamic field.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDynamicField,
    ) -> Result<DynamicField, sqlx::Error> {
        let query = format!(
            "INSERT INTO dynamic_fields (entity, title, field_type, required, multiple) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DynamicField>(&query)
            .bind(&input.entity)
            .bind(&input.title)
            .bind(input.field_type.as_str())
            .bind(input.required)
            .bind(input.multiple)
            .fetch_one(pool)
            .await
    }

    /// Update title / required / multiple. The type is immutable.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDynamicField,
    ) -> Result<Option<DynamicField>, sqlx::Error> {
        let query = format!(
            "UPDATE dynamic_fields SET \
                title = COALESCE($2, title), \
                required = COALESCE($3, required), \
                multiple = COALESCE($4, multiple), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DynamicField>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.required)
            .bind(input.multiple)
            .fetch_optional(pool)
            .await
    }

    /// Delete a field and everything hanging off it: selections, options,
    /// values, then the field row, in one transaction. A mid-cascade
    /// failure rolls everything back; no partial state survives.
    ///
    /// Permission rows referencing the field are deliberately left in
    /// place (see DESIGN.md).
    ///
    /// Returns `true` if the field existed.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM dropdown_selections WHERE field_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM dropdown_options WHERE field_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM dynamic_field_values WHERE field_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM dynamic_fields WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(field_id = id, "Dynamic field deleted with cascade");
        }
        Ok(deleted)
    }
}
