//! EAV value rows: one row per (field, record), one typed column populated.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use tempo_core::dynamic::{FieldType, ScalarValue};
use tempo_core::types::{DbId, Timestamp};

/// A row from `dynamic_field_values`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DynamicFieldValue {
    pub id: DbId,
    pub field_id: DbId,
    /// Polymorphic: the owning entity type is inferred from the field's
    /// declared entity, not stored here.
    pub record_id: DbId,
    pub int_value: Option<i64>,
    pub float_value: Option<f64>,
    pub string_value: Option<String>,
    pub text_value: Option<String>,
    pub date_value: Option<NaiveDate>,
    pub datetime_value: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DynamicFieldValue {
    /// Decode the populated column into a typed scalar, guided by the
    /// field's declared type.
    pub fn decode(&self, field_type: FieldType) -> Option<ScalarValue> {
        match field_type {
            FieldType::Int => self.int_value.map(ScalarValue::Int),
            FieldType::Bool => self.int_value.map(|n| ScalarValue::Bool(n != 0)),
            FieldType::Float => self.float_value.map(ScalarValue::Float),
            FieldType::String => self.string_value.clone().map(ScalarValue::String),
            FieldType::Text => self.text_value.clone().map(ScalarValue::Text),
            FieldType::Date => self.date_value.map(ScalarValue::Date),
            FieldType::DateTime => self.datetime_value.map(ScalarValue::DateTime),
            FieldType::Dropdown | FieldType::DropdownFromSource => None,
        }
    }
}
