//! Resolution of loaded EAV rows into per-field display values.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::dynamic::{DynamicFieldSpec, ScalarValue};
use crate::types::DbId;

/// A scalar EAV row already decoded into its typed value.
#[derive(Debug, Clone)]
pub struct LoadedScalar {
    pub field_id: DbId,
    pub value: ScalarValue,
}

/// A dropdown selection row.
#[derive(Debug, Clone)]
pub struct LoadedSelection {
    pub field_id: DbId,
    pub option_id: DbId,
}

/// A dropdown option's id and label.
#[derive(Debug, Clone)]
pub struct OptionLabel {
    pub id: DbId,
    pub label: String,
}

/// A field's resolved display value for one record.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedValue {
    pub field_id: DbId,
    pub title: String,
    pub value: Value,
}

/// Group loaded rows by field and resolve display values.
///
/// Scalar rows pass their typed value through; dropdown selections resolve
/// to option labels, multiple labels joined with `", "` in option order.
/// Fields with no stored value are omitted from the result.
pub fn resolve_record_values(
    fields: &[DynamicFieldSpec],
    scalars: &[LoadedScalar],
    selections: &[LoadedSelection],
    options: &[OptionLabel],
) -> BTreeMap<DbId, ResolvedValue> {
    let mut result = BTreeMap::new();

    for field in fields {
        let value = if field.field_type.is_dropdown() {
            let labels: Vec<&str> = selections
                .iter()
                .filter(|s| s.field_id == field.id)
                .filter_map(|s| {
                    options
                        .iter()
                        .find(|o| o.id == s.option_id)
                        .map(|o| o.label.as_str())
                })
                .collect();
            if labels.is_empty() {
                continue;
            }
            Value::from(labels.join(", "))
        } else {
            match scalars.iter().find(|s| s.field_id == field.id) {
                Some(row) => row.value.display(),
                None => continue,
            }
        };

        result.insert(
            field.id,
            ResolvedValue {
                field_id: field.id,
                title: field.title.clone(),
                value,
            },
        );
    }

    result
}
