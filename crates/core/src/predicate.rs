//! The filter predicate DSL handed to the record store, and the
//! translation from stored filter settings into it.
//!
//! Filters are stored as (column, operator, value) rows. Translation is
//! pure: the record store receives a closed tagged union and renders SQL
//! however it likes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dynamic::DynamicFieldSpec;
use crate::entity::parse_dynamic_field_key;
use crate::error::CoreError;
use crate::types::DbId;

/// Sort direction for an ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CoreError::Validation(format!(
                "Unknown sort direction '{other}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// A filter operator as stored on a `table_filter_settings` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Between,
    In,
    NotIn,
    IsNull,
    NotNull,
    Contains,
    NotContains,
}

impl FilterOp {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "gt" => Ok(Self::Gt),
            "lt" => Ok(Self::Lt),
            "gte" => Ok(Self::Gte),
            "lte" => Ok(Self::Lte),
            "between" => Ok(Self::Between),
            "in" => Ok(Self::In),
            "not_in" => Ok(Self::NotIn),
            "is_null" => Ok(Self::IsNull),
            "not_null" => Ok(Self::NotNull),
            "contains" => Ok(Self::Contains),
            "not_contains" => Ok(Self::NotContains),
            other => Err(CoreError::Validation(format!(
                "Unknown filter operator '{other}'"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::IsNull => "is_null",
            Self::NotNull => "not_null",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
        }
    }
}

/// Closed predicate union. Leaf columns are physical column names already
/// validated against the entity's whitelist by the time SQL is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Eq { column: String, value: Value },
    Ne { column: String, value: Value },
    Gt { column: String, value: Value },
    Lt { column: String, value: Value },
    Gte { column: String, value: Value },
    Lte { column: String, value: Value },
    Between { column: String, low: Value, high: Value },
    In { column: String, values: Vec<Value> },
    NotIn { column: String, values: Vec<Value> },
    IsNull { column: String },
    IsNotNull { column: String },
    Like { column: String, pattern: String },
    NotLike { column: String, pattern: String },
    And { preds: Vec<Predicate> },
    Or { preds: Vec<Predicate> },
    /// A condition on a dynamic field, to be rendered as an EXISTS
    /// subquery against the EAV value table. `inner` refers to the typed
    /// value column picked by the field's declared type.
    DynamicField { field_id: DbId, inner: Box<Predicate> },
}

/// One effective filter rule after personal/global merge: the column key
/// (static name or `dyn_<id>`), the operator, and the stored raw value.
#[derive(Debug, Clone)]
pub struct EffectiveFilter {
    pub column: String,
    pub operator: FilterOp,
    pub value: Value,
}

/// Translate merged filter rules into one predicate (AND of all rules).
///
/// Dynamic-field rules are remapped to the physical value column implied by
/// the field's type; a field whose type maps to no scalar column (the
/// dropdown types) cannot be filtered through this path and is silently
/// dropped. Malformed rules (e.g. a `between` without a two-element array)
/// are dropped the same way.
pub fn filters_to_predicate(
    filters: &[EffectiveFilter],
    dynamic_fields: &[DynamicFieldSpec],
) -> Option<Predicate> {
    let mut preds = Vec::new();

    for filter in filters {
        let pred = match parse_dynamic_field_key(&filter.column) {
            Some(field_id) => {
                let Some(field) = dynamic_fields.iter().find(|f| f.id == field_id) else {
                    continue;
                };
                let Some(column) = field.field_type.value_column() else {
                    continue;
                };
                leaf_predicate(column.column_name(), filter.operator, &filter.value)
                    .map(|inner| Predicate::DynamicField {
                        field_id,
                        inner: Box::new(inner),
                    })
            }
            None => leaf_predicate(&filter.column, filter.operator, &filter.value),
        };

        if let Some(p) = pred {
            preds.push(p);
        }
    }

    match preds.len() {
        0 => None,
        1 => preds.pop(),
        _ => Some(Predicate::And { preds }),
    }
}

fn leaf_predicate(column: &str, op: FilterOp, value: &Value) -> Option<Predicate> {
    let column = column.to_string();
    match op {
        FilterOp::Eq => Some(Predicate::Eq {
            column,
            value: value.clone(),
        }),
        FilterOp::Ne => Some(Predicate::Ne {
            column,
            value: value.clone(),
        }),
        FilterOp::Gt => Some(Predicate::Gt {
            column,
            value: value.clone(),
        }),
        FilterOp::Lt => Some(Predicate::Lt {
            column,
            value: value.clone(),
        }),
        FilterOp::Gte => Some(Predicate::Gte {
            column,
            value: value.clone(),
        }),
        FilterOp::Lte => Some(Predicate::Lte {
            column,
            value: value.clone(),
        }),
        FilterOp::Between => match value.as_array() {
            Some(bounds) if bounds.len() == 2 => Some(Predicate::Between {
                column,
                low: bounds[0].clone(),
                high: bounds[1].clone(),
            }),
            _ => None,
        },
        FilterOp::In | FilterOp::NotIn => {
            let values = match value {
                Value::Array(items) => items.clone(),
                Value::Null => return None,
                scalar => vec![scalar.clone()],
            };
            if values.is_empty() {
                return None;
            }
            Some(if op == FilterOp::In {
                Predicate::In { column, values }
            } else {
                Predicate::NotIn { column, values }
            })
        }
        FilterOp::IsNull => Some(Predicate::IsNull { column }),
        FilterOp::NotNull => Some(Predicate::IsNotNull { column }),
        FilterOp::Contains | FilterOp::NotContains => {
            // Stored as one comma-joined string; split back into a list.
            let needles: Vec<String> = value
                .as_str()
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            if needles.is_empty() {
                return None;
            }

            let likes: Vec<Predicate> = needles
                .into_iter()
                .map(|n| {
                    let pattern = format!("%{n}%");
                    if op == FilterOp::Contains {
                        Predicate::Like {
                            column: column.clone(),
                            pattern,
                        }
                    } else {
                        Predicate::NotLike {
                            column: column.clone(),
                            pattern,
                        }
                    }
                })
                .collect();

            Some(match (likes.len(), op) {
                (1, _) => likes.into_iter().next().unwrap(),
                (_, FilterOp::Contains) => Predicate::Or { preds: likes },
                _ => Predicate::And { preds: likes },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::FieldType;
    use serde_json::json;

    fn dyn_field(id: DbId, field_type: FieldType) -> DynamicFieldSpec {
        DynamicFieldSpec {
            id,
            title: format!("Field {id}"),
            field_type,
            required: false,
            multiple: false,
        }
    }

    fn filter(column: &str, operator: FilterOp, value: Value) -> EffectiveFilter {
        EffectiveFilter {
            column: column.into(),
            operator,
            value,
        }
    }

    #[test]
    fn test_single_filter_is_not_wrapped_in_and() {
        let pred = filters_to_predicate(
            &[filter("name", FilterOp::Eq, json!("Alice"))],
            &[],
        )
        .unwrap();
        assert_eq!(
            pred,
            Predicate::Eq {
                column: "name".into(),
                value: json!("Alice")
            }
        );
    }

    #[test]
    fn test_multiple_filters_and_combined() {
        let pred = filters_to_predicate(
            &[
                filter("salary", FilterOp::Gte, json!(1000)),
                filter("salary", FilterOp::Lte, json!(2000)),
            ],
            &[],
        )
        .unwrap();
        assert!(matches!(pred, Predicate::And { ref preds } if preds.len() == 2));
    }

    #[test]
    fn test_contains_splits_comma_joined_value() {
        let pred = filters_to_predicate(
            &[filter("name", FilterOp::Contains, json!("foo, bar"))],
            &[],
        )
        .unwrap();
        assert_eq!(
            pred,
            Predicate::Or {
                preds: vec![
                    Predicate::Like {
                        column: "name".into(),
                        pattern: "%foo%".into()
                    },
                    Predicate::Like {
                        column: "name".into(),
                        pattern: "%bar%".into()
                    },
                ]
            }
        );
    }

    #[test]
    fn test_not_contains_is_and_of_not_likes() {
        let pred = filters_to_predicate(
            &[filter("name", FilterOp::NotContains, json!("a,b"))],
            &[],
        )
        .unwrap();
        assert!(matches!(pred, Predicate::And { ref preds } if preds.len() == 2));
    }

    #[test]
    fn test_dynamic_int_filter_remapped_to_int_column() {
        let fields = vec![dyn_field(5, FieldType::Int)];
        let pred = filters_to_predicate(
            &[filter("dyn_5", FilterOp::Gt, json!(10))],
            &fields,
        )
        .unwrap();
        assert_eq!(
            pred,
            Predicate::DynamicField {
                field_id: 5,
                inner: Box::new(Predicate::Gt {
                    column: "int_value".into(),
                    value: json!(10)
                })
            }
        );
    }

    #[test]
    fn test_dropdown_filter_silently_dropped() {
        let fields = vec![dyn_field(5, FieldType::Dropdown)];
        let pred = filters_to_predicate(
            &[filter("dyn_5", FilterOp::Eq, json!("High"))],
            &fields,
        );
        assert_eq!(pred, None);
    }

    #[test]
    fn test_unknown_dynamic_field_dropped() {
        let pred = filters_to_predicate(&[filter("dyn_99", FilterOp::Eq, json!(1))], &[]);
        assert_eq!(pred, None);
    }

    #[test]
    fn test_between_requires_two_bounds() {
        assert_eq!(
            filters_to_predicate(&[filter("salary", FilterOp::Between, json!([1]))], &[]),
            None
        );
        let pred = filters_to_predicate(
            &[filter("salary", FilterOp::Between, json!([1, 5]))],
            &[],
        )
        .unwrap();
        assert_eq!(
            pred,
            Predicate::Between {
                column: "salary".into(),
                low: json!(1),
                high: json!(5)
            }
        );
    }

    #[test]
    fn test_in_accepts_scalar_as_single_element() {
        let pred =
            filters_to_predicate(&[filter("status", FilterOp::In, json!("open"))], &[]).unwrap();
        assert_eq!(
            pred,
            Predicate::In {
                column: "status".into(),
                values: vec![json!("open")]
            }
        );
    }

    #[test]
    fn test_null_checks_ignore_value() {
        let pred = filters_to_predicate(
            &[filter("end_date", FilterOp::IsNull, json!("ignored"))],
            &[],
        )
        .unwrap();
        assert_eq!(
            pred,
            Predicate::IsNull {
                column: "end_date".into()
            }
        );
    }
}
