//! Dropdown option and selection rows.

use serde::Serialize;
use sqlx::FromRow;
use tempo_core::types::{DbId, Timestamp};

/// A row from `dropdown_options`. `ordering` is a loosely-dense sequence;
/// "next" is max+1 and a full reorder rewrites 1..N.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DropdownOption {
    pub id: DbId,
    pub field_id: DbId,
    pub label: String,
    pub ordering: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `dropdown_selections`: one chosen option for a record.
/// Single-select fields keep at most one row, enforced by the replace-all
/// save rather than a uniqueness constraint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DropdownSelection {
    pub id: DbId,
    pub field_id: DbId,
    pub record_id: DbId,
    pub option_id: DbId,
    pub created_at: Timestamp,
}
