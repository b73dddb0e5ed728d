//! Dynamic (administrator-defined) field typing, storage-column mapping,
//! and raw-value coercion.
//!
//! A dynamic field extends an entity's schema at runtime. Scalar types live
//! in one EAV row per (field, record) with one typed column populated;
//! dropdown types live in selection rows and never touch the scalar
//! columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::Timestamp;

/// The data type of a field (static or dynamic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Int,
    Float,
    String,
    Text,
    Date,
    DateTime,
    Dropdown,
    DropdownFromSource,
    Bool,
}

impl FieldType {
    /// Parse a storage discriminator.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "dropdown" => Ok(Self::Dropdown),
            "dropdown_from_source" => Ok(Self::DropdownFromSource),
            "bool" => Ok(Self::Bool),
            other => Err(CoreError::Validation(format!(
                "Unknown field type '{other}'"
            ))),
        }
    }

    /// Storage discriminator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Dropdown => "dropdown",
            Self::DropdownFromSource => "dropdown_from_source",
            Self::Bool => "bool",
        }
    }

    /// The physical EAV column this type stores into, or `None` for
    /// dropdown types (stored as selection rows instead).
    ///
    /// Adding a type means adding one arm here; the value repo and the
    /// filter remap both go through this single lookup.
    pub fn value_column(self) -> Option<ValueColumn> {
        match self {
            Self::Int | Self::Bool => Some(ValueColumn::Int),
            Self::Float => Some(ValueColumn::Float),
            Self::String => Some(ValueColumn::String),
            Self::Text => Some(ValueColumn::Text),
            Self::Date => Some(ValueColumn::Date),
            Self::DateTime => Some(ValueColumn::DateTime),
            Self::Dropdown | Self::DropdownFromSource => None,
        }
    }

    /// Whether this type stores selection rows rather than a scalar.
    pub fn is_dropdown(self) -> bool {
        matches!(self, Self::Dropdown | Self::DropdownFromSource)
    }
}

/// A dynamic field as the pure layer sees it: the DB row projected onto
/// the pieces resolution needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicFieldSpec {
    pub id: crate::types::DbId,
    pub title: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Whether a Dropdown accepts several selections. Non-dropdown types
    /// are always single-valued per record.
    pub multiple: bool,
}

/// One of the six typed columns on the `dynamic_field_values` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    Int,
    Float,
    String,
    Text,
    Date,
    DateTime,
}

impl ValueColumn {
    /// Physical column name.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Int => "int_value",
            Self::Float => "float_value",
            Self::String => "string_value",
            Self::Text => "text_value",
            Self::Date => "date_value",
            Self::DateTime => "datetime_value",
        }
    }
}

/// A typed scalar ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    String(String),
    Text(String),
    Date(NaiveDate),
    DateTime(Timestamp),
    /// Stored in the int column as 0/1.
    Bool(bool),
}

impl ScalarValue {
    /// Display rendering used by `values_for_record`.
    pub fn display(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Float(f) => Value::from(*f),
            Self::String(s) | Self::Text(s) => Value::from(s.clone()),
            Self::Date(d) => Value::from(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(t) => Value::from(t.to_rfc3339()),
            Self::Bool(b) => Value::from(*b),
        }
    }
}

/// Coerce a raw JSON value into a typed scalar for the given field type.
///
/// Numeric types replicate the legacy falsy-to-null rule: `null`, `0`,
/// `0.0`, `false`, and the empty string all normalize to `None` (nothing
/// stored) rather than a stored zero. A real zero therefore cannot be
/// persisted for Int/Float dynamic fields; see DESIGN.md before "fixing".
pub fn coerce_scalar(field_type: FieldType, raw: &Value) -> Result<Option<ScalarValue>, CoreError> {
    if field_type.is_dropdown() {
        return Err(CoreError::Internal(
            "dropdown values are stored as selections, not scalars".into(),
        ));
    }

    if raw.is_null() {
        return Ok(None);
    }

    match field_type {
        FieldType::Int => {
            let n = match raw {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f as i64))
                    .ok_or_else(|| invalid(raw, "integer"))?,
                Value::String(s) if s.trim().is_empty() => return Ok(None),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| invalid(raw, "integer"))?,
                Value::Bool(b) => i64::from(*b),
                _ => return Err(invalid(raw, "integer")),
            };
            Ok(if n == 0 { None } else { Some(ScalarValue::Int(n)) })
        }
        FieldType::Float => {
            let f = match raw {
                Value::Number(n) => n.as_f64().ok_or_else(|| invalid(raw, "number"))?,
                Value::String(s) if s.trim().is_empty() => return Ok(None),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| invalid(raw, "number"))?,
                Value::Bool(b) => f64::from(i8::from(*b)),
                _ => return Err(invalid(raw, "number")),
            };
            Ok(if f == 0.0 {
                None
            } else {
                Some(ScalarValue::Float(f))
            })
        }
        FieldType::String => match raw {
            Value::String(s) => Ok(Some(ScalarValue::String(s.clone()))),
            Value::Number(n) => Ok(Some(ScalarValue::String(n.to_string()))),
            Value::Bool(b) => Ok(Some(ScalarValue::String(b.to_string()))),
            _ => Err(invalid(raw, "string")),
        },
        FieldType::Text => match raw {
            Value::String(s) => Ok(Some(ScalarValue::Text(s.clone()))),
            _ => Err(invalid(raw, "text")),
        },
        FieldType::Date => match raw {
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(|d| Some(ScalarValue::Date(d)))
                .map_err(|_| invalid(raw, "date (YYYY-MM-DD)")),
            _ => Err(invalid(raw, "date (YYYY-MM-DD)")),
        },
        FieldType::DateTime => match raw {
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(s.trim())
                .map(|t| Some(ScalarValue::DateTime(t.with_timezone(&chrono::Utc))))
                .map_err(|_| invalid(raw, "RFC 3339 datetime")),
            _ => Err(invalid(raw, "RFC 3339 datetime")),
        },
        FieldType::Bool => match raw {
            Value::Bool(b) => Ok(Some(ScalarValue::Bool(*b))),
            Value::Number(n) => Ok(Some(ScalarValue::Bool(n.as_i64() != Some(0)))),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => match s.trim() {
                "true" | "1" => Ok(Some(ScalarValue::Bool(true))),
                "false" | "0" => Ok(Some(ScalarValue::Bool(false))),
                _ => Err(invalid(raw, "boolean")),
            },
            _ => Err(invalid(raw, "boolean")),
        },
        FieldType::Dropdown | FieldType::DropdownFromSource => unreachable!(),
    }
}

fn invalid(raw: &Value, expected: &str) -> CoreError {
    CoreError::Validation(format!("Invalid value {raw}: expected {expected}"))
}

/// Soft validation: returns human-readable messages instead of failing.
///
/// Callers check the list is empty before persisting; an ordinary
/// validation problem (missing required value, unparsable number or date)
/// is data, not an error.
pub fn validate_value(
    title: &str,
    field_type: FieldType,
    required: bool,
    raw: &Value,
) -> Vec<String> {
    let mut errors = Vec::new();

    let is_empty = raw.is_null()
        || matches!(raw, Value::String(s) if s.trim().is_empty())
        || matches!(raw, Value::Array(items) if items.is_empty());

    if required && is_empty {
        errors.push(format!("{title} is required"));
        return errors;
    }

    if is_empty || field_type.is_dropdown() {
        return errors;
    }

    if let Err(e) = coerce_scalar(field_type, raw) {
        errors.push(format!("{title}: {e}"));
    }

    errors
}
