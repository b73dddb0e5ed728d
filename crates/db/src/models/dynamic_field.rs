//! Administrator-defined dynamic field rows.

use serde::Serialize;
use sqlx::FromRow;
use tempo_core::dynamic::{DynamicFieldSpec, FieldType};
use tempo_core::error::CoreError;
use tempo_core::types::{DbId, Timestamp};

/// A row from `dynamic_fields`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DynamicField {
    pub id: DbId,
    pub entity: String,
    pub title: String,
    pub field_type: String,
    pub required: bool,
    pub multiple: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DynamicField {
    /// Decode the stored type discriminator.
    pub fn kind(&self) -> Result<FieldType, CoreError> {
        FieldType::parse(&self.field_type)
    }

    /// Project onto the pure-layer spec.
    pub fn to_spec(&self) -> Result<DynamicFieldSpec, CoreError> {
        Ok(DynamicFieldSpec {
            id: self.id,
            title: self.title.clone(),
            field_type: self.kind()?,
            required: self.required,
            multiple: self.multiple,
        })
    }
}

/// Fields for creating a dynamic field.
#[derive(Debug, Clone)]
pub struct CreateDynamicField {
    pub entity: String,
    pub title: String,
    pub field_type: FieldType,
    pub required: bool,
    pub multiple: bool,
}

/// Fields for updating a dynamic field. The type is immutable after
/// creation; changing it would orphan stored values.
#[derive(Debug, Clone)]
pub struct UpdateDynamicField {
    pub title: Option<String>,
    pub required: Option<bool>,
    pub multiple: Option<bool>,
}
