//! Repository for the four table-setting tables.
//!
//! Every kind is keyed by (user_id nullable, entity, column). The
//! at-most-one-row-per-slot rule is application-level: an update is tried
//! first (`IS NOT DISTINCT FROM` so a NULL user matches the global row)
//! and an insert follows only when nothing matched. Concurrent savers can
//! still race into duplicates; readers tolerate that (first row wins).

use sqlx::PgPool;
use tempo_core::entity::Entity;
use tempo_core::types::DbId;

use crate::models::table_setting::{
    TableFilterSetting, TableOrderingSetting, TableSortSetting, TableViewSetting,
};

const VIEW_COLUMNS: &str =
    "id, user_id, entity, column_key, hidden, width, created_at, updated_at";
const ORDERING_COLUMNS: &str =
    "id, user_id, entity, column_key, ordering, created_at, updated_at";
const SORT_COLUMNS: &str =
    "id, user_id, entity, column_key, direction, priority, created_at, updated_at";
const FILTER_COLUMNS: &str =
    "id, user_id, entity, column_key, operator, value, created_at, updated_at";

/// Provides data access for per-user and organization-wide table settings.
pub struct TableSettingRepo;

impl TableSettingRepo {
    /* ---------------------------------------------------------------------
    View (display) settings
    --------------------------------------------------------------------- */

    /// Personal and global view rows relevant to one (user, entity) pair.
    pub async fn list_view(
        pool: &PgPool,
        entity: Entity,
        user_id: DbId,
    ) -> Result<Vec<TableViewSetting>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM table_view_settings \
             WHERE entity = $1 AND (user_id = $2 OR user_id IS NULL) \
             ORDER BY id"
        );
        sqlx::query_as::<_, TableViewSetting>(&query)
            .bind(entity.as_str())
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Upsert a view rule. `user_id = None` writes the `for_all` row.
    pub async fn save_view(
        pool: &PgPool,
        user_id: Option<DbId>,
        entity: Entity,
        column: &str,
        hidden: bool,
        width: Option<i32>,
    ) -> Result<TableViewSetting, sqlx::Error> {
        let update = format!(
            "UPDATE table_view_settings SET hidden = $4, width = $5, updated_at = now() \
             WHERE entity = $1 AND column_key = $2 AND user_id IS NOT DISTINCT FROM $3 \
             RETURNING {VIEW_COLUMNS}"
        );
        if let Some(row) = sqlx::query_as::<_, TableViewSetting>(&update)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(hidden)
            .bind(width)
            .fetch_optional(pool)
            .await?
        {
            return Ok(row);
        }

        let insert = format!(
            "INSERT INTO table_view_settings (user_id, entity, column_key, hidden, width) \
             VALUES ($3, $1, $2, $4, $5) \
             RETURNING {VIEW_COLUMNS}"
        );
        sqlx::query_as::<_, TableViewSetting>(&insert)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(hidden)
            .bind(width)
            .fetch_one(pool)
            .await
    }

    /* ---------------------------------------------------------------------
    Column ordering settings
    --------------------------------------------------------------------- */

    pub async fn list_ordering(
        pool: &PgPool,
        entity: Entity,
        user_id: DbId,
    ) -> Result<Vec<TableOrderingSetting>, sqlx::Error> {
        let query = format!(
            "SELECT {ORDERING_COLUMNS} FROM table_ordering_settings \
             WHERE entity = $1 AND (user_id = $2 OR user_id IS NULL) \
             ORDER BY id"
        );
        sqlx::query_as::<_, TableOrderingSetting>(&query)
            .bind(entity.as_str())
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn save_ordering(
        pool: &PgPool,
        user_id: Option<DbId>,
        entity: Entity,
        column: &str,
        ordering: i32,
    ) -> Result<TableOrderingSetting, sqlx::Error> {
        let update = format!(
            "UPDATE table_ordering_settings SET ordering = $4, updated_at = now() \
             WHERE entity = $1 AND column_key = $2 AND user_id IS NOT DISTINCT FROM $3 \
             RETURNING {ORDERING_COLUMNS}"
        );
        if let Some(row) = sqlx::query_as::<_, TableOrderingSetting>(&update)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(ordering)
            .fetch_optional(pool)
            .await?
        {
            return Ok(row);
        }

        let insert = format!(
            "INSERT INTO table_ordering_settings (user_id, entity, column_key, ordering) \
             VALUES ($3, $1, $2, $4) \
             RETURNING {ORDERING_COLUMNS}"
        );
        sqlx::query_as::<_, TableOrderingSetting>(&insert)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(ordering)
            .fetch_one(pool)
            .await
    }

    /* ---------------------------------------------------------------------
    Sort-within-column settings
    --------------------------------------------------------------------- */

    pub async fn list_sort(
        pool: &PgPool,
        entity: Entity,
        user_id: DbId,
    ) -> Result<Vec<TableSortSetting>, sqlx::Error> {
        let query = format!(
            "SELECT {SORT_COLUMNS} FROM table_sort_settings \
             WHERE entity = $1 AND (user_id = $2 OR user_id IS NULL) \
             ORDER BY id"
        );
        sqlx::query_as::<_, TableSortSetting>(&query)
            .bind(entity.as_str())
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn save_sort(
        pool: &PgPool,
        user_id: Option<DbId>,
        entity: Entity,
        column: &str,
        direction: &str,
        priority: i32,
    ) -> Result<TableSortSetting, sqlx::Error> {
        let update = format!(
            "UPDATE table_sort_settings SET direction = $4, priority = $5, updated_at = now() \
             WHERE entity = $1 AND column_key = $2 AND user_id IS NOT DISTINCT FROM $3 \
             RETURNING {SORT_COLUMNS}"
        );
        if let Some(row) = sqlx::query_as::<_, TableSortSetting>(&update)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(direction)
            .bind(priority)
            .fetch_optional(pool)
            .await?
        {
            return Ok(row);
        }

        let insert = format!(
            "INSERT INTO table_sort_settings (user_id, entity, column_key, direction, priority) \
             VALUES ($3, $1, $2, $4, $5) \
             RETURNING {SORT_COLUMNS}"
        );
        sqlx::query_as::<_, TableSortSetting>(&insert)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(direction)
            .bind(priority)
            .fetch_one(pool)
            .await
    }

    /* ---------------------------------------------------------------------
    Filter settings
    --------------------------------------------------------------------- */

    pub async fn list_filter(
        pool: &PgPool,
        entity: Entity,
        user_id: DbId,
    ) -> Result<Vec<TableFilterSetting>, sqlx::Error> {
        let query = format!(
            "SELECT {FILTER_COLUMNS} FROM table_filter_settings \
             WHERE entity = $1 AND (user_id = $2 OR user_id IS NULL) \
             ORDER BY id"
        );
        sqlx::query_as::<_, TableFilterSetting>(&query)
            .bind(entity.as_str())
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn save_filter(
        pool: &PgPool,
        user_id: Option<DbId>,
        entity: Entity,
        column: &str,
        operator: &str,
        value: &serde_json::Value,
    ) -> Result<TableFilterSetting, sqlx::Error> {
        let update = format!(
            "UPDATE table_filter_settings SET operator = $4, value = $5, updated_at = now() \
             WHERE entity = $1 AND column_key = $2 AND user_id IS NOT DISTINCT FROM $3 \
             RETURNING {FILTER_COLUMNS}"
        );
        if let Some(row) = sqlx::query_as::<_, TableFilterSetting>(&update)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(operator)
            .bind(value)
            .fetch_optional(pool)
            .await?
        {
            return Ok(row);
        }

        let insert = format!(
            "INSERT INTO table_filter_settings (user_id, entity, column_key, operator, value) \
             VALUES ($3, $1, $2, $4, $5) \
             RETURNING {FILTER_COLUMNS}"
        );
        sqlx::query_as::<_, TableFilterSetting>(&insert)
            .bind(entity.as_str())
            .bind(column)
            .bind(user_id)
            .bind(operator)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    /// Remove a personal or global filter rule for one column.
    pub async fn delete_filter(
        pool: &PgPool,
        user_id: Option<DbId>,
        entity: Entity,
        column: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM table_filter_settings \
             WHERE entity = $1 AND column_key = $2 AND user_id IS NOT DISTINCT FROM $3",
        )
        .bind(entity.as_str())
        .bind(column)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
