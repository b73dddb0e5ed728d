//! Table setting rows: four kinds, each keyed by (nullable user, entity,
//! column). A NULL `user_id` marks an organization-wide (`for_all`) row.

use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use tempo_core::types::{DbId, Timestamp};

/// A row from `table_view_settings` (display rule).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableViewSetting {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub entity: String,
    pub column_key: String,
    pub hidden: bool,
    pub width: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `table_ordering_settings` (column position).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableOrderingSetting {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub entity: String,
    pub column_key: String,
    pub ordering: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `table_sort_settings` (sort within a column, with priority
/// for multi-column sorts).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableSortSetting {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub entity: String,
    pub column_key: String,
    pub direction: String,
    pub priority: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `table_filter_settings`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableFilterSetting {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub entity: String,
    pub column_key: String,
    pub operator: String,
    pub value: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
