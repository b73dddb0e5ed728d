//! Detail/card view field ordering rows. Personal only; no `for_all`
//! variant exists for this kind.

use serde::Serialize;
use sqlx::FromRow;
use tempo_core::types::{DbId, Timestamp};

/// A row from `fields_orderings`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FieldsOrdering {
    pub id: DbId,
    pub user_id: DbId,
    pub entity: String,
    pub field: String,
    pub ordering: i32,
    pub created_at: Timestamp,
}
