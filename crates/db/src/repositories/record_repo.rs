//! The record store: generic filtered access to entity tables.
//!
//! Consumes the core predicate DSL and renders parameterized SQL. Leaf
//! comparisons go through `to_jsonb(column) <op> $n::jsonb` so one
//! rendering path covers numeric, text, boolean, and ISO-date values
//! without per-column type plumbing; `LIKE` casts the column to text.
//! Column names are validated against a strict identifier rule before
//! interpolation.

use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;
use tempo_core::dynamic::FieldType;
use tempo_core::entity::Entity;
use tempo_core::error::CoreError;
use tempo_core::predicate::{Predicate, SortSpec};
use tempo_core::types::DbId;

/// Errors from the record store: either a malformed predicate/row or a
/// database failure.
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// A deferred bind parameter.
enum Bind {
    Json(Value),
    Text(String),
    Id(DbId),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(tempo_core::types::Timestamp),
    NullText,
}

/// Generic filtered read/write access to entity tables.
pub struct RecordRepo;

impl RecordRepo {
    /// Fetch rows matching the predicate, ordered by the sort list.
    ///
    /// Rows come back as JSON objects (`row_to_json`), matching the
    /// "JSON-serializable structures" contract of the listing surface.
    /// Sort terms on dynamic-field keys are skipped here; orderings the
    /// store cannot express are the caller's concern.
    pub async fn query(
        pool: &PgPool,
        entity: Entity,
        predicate: Option<&Predicate>,
        sort: &[SortSpec],
    ) -> Result<Vec<Value>, RecordStoreError> {
        let mut binds = Vec::new();
        let mut sql = format!(
            "SELECT row_to_json(t)::jsonb AS data FROM {} t WHERE t.deleted = FALSE",
            entity.table()
        );

        if let Some(pred) = predicate {
            let clause = render_predicate(pred, "t", &mut binds)?;
            sql.push_str(" AND ");
            sql.push_str(&clause);
        }

        let order_terms: Vec<String> = sort
            .iter()
            .filter(|s| is_safe_ident(&s.column) && !s.column.starts_with("dyn_"))
            .map(|s| {
                format!(
                    "t.{} {}",
                    s.column,
                    match s.direction {
                        tempo_core::predicate::SortDirection::Asc => "ASC",
                        tempo_core::predicate::SortDirection::Desc => "DESC",
                    }
                )
            })
            .collect();
        if !order_terms.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_terms.join(", "));
        } else {
            sql.push_str(" ORDER BY t.id");
        }

        let mut query = sqlx::query_as::<_, (Value,)>(&sql);
        for bind in binds {
            query = apply_bind(query, bind);
        }

        let rows = query.fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(data,)| data).collect())
    }

    /// Insert a row from a JSON field map validated against the entity's
    /// static schema. Returns the new id.
    pub async fn insert(
        pool: &PgPool,
        entity: Entity,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<DbId, RecordStoreError> {
        let defs = entity.static_fields();
        let mut columns = Vec::new();
        let mut placeholders = Vec::new();
        let mut binds = Vec::new();

        for (name, value) in fields {
            let def = defs
                .iter()
                .find(|d| &d.name == name)
                .ok_or_else(|| unknown_column(entity, name))?;
            binds.push(typed_bind(def.field_type, value)?);
            columns.push(name.clone());
            placeholders.push(format!("${}", binds.len()));
        }

        if columns.is_empty() {
            return Err(CoreError::Validation("No fields to insert".into()).into());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
            entity.table(),
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, (DbId,)>(&sql);
        for bind in binds {
            query = apply_bind(query, bind);
        }
        let (id,) = query.fetch_one(pool).await?;
        Ok(id)
    }

    /// Update a row from a JSON field map. Returns `true` when the row
    /// existed.
    pub async fn update(
        pool: &PgPool,
        entity: Entity,
        id: DbId,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<bool, RecordStoreError> {
        let defs = entity.static_fields();
        let mut assignments = Vec::new();
        let mut binds = Vec::new();

        for (name, value) in fields {
            let def = defs
                .iter()
                .find(|d| &d.name == name)
                .ok_or_else(|| unknown_column(entity, name))?;
            binds.push(typed_bind(def.field_type, value)?);
            assignments.push(format!("{} = ${}", name, binds.len()));
        }

        if assignments.is_empty() {
            return Err(CoreError::Validation("No fields to update".into()).into());
        }

        let sql = format!(
            "UPDATE {} SET {}, updated_at = now() WHERE id = ${} AND deleted = FALSE",
            entity.table(),
            assignments.join(", "),
            binds.len() + 1
        );

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = apply_query_bind(query, bind);
        }
        let result = query.bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a row (sets the `deleted` flag).
    pub async fn soft_delete(
        pool: &PgPool,
        entity: Entity,
        id: DbId,
    ) -> Result<bool, RecordStoreError> {
        let sql = format!(
            "UPDATE {} SET deleted = TRUE, updated_at = now() WHERE id = $1 AND deleted = FALSE",
            entity.table()
        );
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn unknown_column(entity: Entity, name: &str) -> CoreError {
    CoreError::Validation(format!(
        "Unknown column '{name}' for entity {}",
        entity.as_str()
    ))
}

fn is_safe_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn checked_ident(name: &str) -> Result<&str, CoreError> {
    if is_safe_ident(name) {
        Ok(name)
    } else {
        Err(CoreError::Validation(format!(
            "Unsafe column identifier '{name}'"
        )))
    }
}

/// Render a predicate to a SQL boolean expression, pushing bind values.
fn render_predicate(
    pred: &Predicate,
    alias: &str,
    binds: &mut Vec<Bind>,
) -> Result<String, CoreError> {
    let jsonb_cmp = |column: &str,
                     op: &str,
                     value: &Value,
                     binds: &mut Vec<Bind>|
     -> Result<String, CoreError> {
        let column = checked_ident(column)?;
        binds.push(Bind::Json(value.clone()));
        Ok(format!(
            "to_jsonb({alias}.{column}) {op} ${}::jsonb",
            binds.len()
        ))
    };

    match pred {
        Predicate::Eq { column, value } => jsonb_cmp(column, "=", value, binds),
        Predicate::Ne { column, value } => jsonb_cmp(column, "<>", value, binds),
        Predicate::Gt { column, value } => jsonb_cmp(column, ">", value, binds),
        Predicate::Lt { column, value } => jsonb_cmp(column, "<", value, binds),
        Predicate::Gte { column, value } => jsonb_cmp(column, ">=", value, binds),
        Predicate::Lte { column, value } => jsonb_cmp(column, "<=", value, binds),
        Predicate::Between { column, low, high } => {
            let column = checked_ident(column)?;
            binds.push(Bind::Json(low.clone()));
            let low_n = binds.len();
            binds.push(Bind::Json(high.clone()));
            let high_n = binds.len();
            Ok(format!(
                "to_jsonb({alias}.{column}) BETWEEN ${low_n}::jsonb AND ${high_n}::jsonb"
            ))
        }
        Predicate::In { column, values } | Predicate::NotIn { column, values } => {
            let column = checked_ident(column)?;
            let mut placeholders = Vec::with_capacity(values.len());
            for v in values {
                binds.push(Bind::Json(v.clone()));
                placeholders.push(format!("${}::jsonb", binds.len()));
            }
            let not = if matches!(pred, Predicate::NotIn { .. }) {
                "NOT "
            } else {
                ""
            };
            Ok(format!(
                "to_jsonb({alias}.{column}) {not}IN ({})",
                placeholders.join(", ")
            ))
        }
        Predicate::IsNull { column } => {
            Ok(format!("{alias}.{} IS NULL", checked_ident(column)?))
        }
        Predicate::IsNotNull { column } => {
            Ok(format!("{alias}.{} IS NOT NULL", checked_ident(column)?))
        }
        Predicate::Like { column, pattern } => {
            let column = checked_ident(column)?;
            binds.push(Bind::Text(pattern.clone()));
            Ok(format!("{alias}.{column}::text LIKE ${}", binds.len()))
        }
        Predicate::NotLike { column, pattern } => {
            let column = checked_ident(column)?;
            binds.push(Bind::Text(pattern.clone()));
            Ok(format!("{alias}.{column}::text NOT LIKE ${}", binds.len()))
        }
        Predicate::And { preds } | Predicate::Or { preds } => {
            if preds.is_empty() {
                return Ok("TRUE".to_string());
            }
            let joiner = if matches!(pred, Predicate::And { .. }) {
                " AND "
            } else {
                " OR "
            };
            let parts: Result<Vec<String>, CoreError> = preds
                .iter()
                .map(|p| render_predicate(p, alias, binds))
                .collect();
            Ok(format!("({})", parts?.join(joiner)))
        }
        Predicate::DynamicField { field_id, inner } => {
            binds.push(Bind::Id(*field_id));
            let field_bind = binds.len();
            let inner_sql = render_predicate(inner, "dfv", binds)?;
            Ok(format!(
                "EXISTS (SELECT 1 FROM dynamic_field_values dfv \
                 WHERE dfv.field_id = ${field_bind} AND dfv.record_id = {alias}.id \
                 AND {inner_sql})"
            ))
        }
    }
}

/// Convert a JSON value into a typed bind using the static column's type.
/// Nulls bind as typed NULLs (text covers every nullable column here).
fn typed_bind(field_type: FieldType, value: &Value) -> Result<Bind, CoreError> {
    if value.is_null() {
        return Ok(Bind::NullText);
    }
    let invalid = || {
        CoreError::Validation(format!(
            "Invalid value {value} for a {} column",
            field_type.as_str()
        ))
    };
    match field_type {
        FieldType::Int => value.as_i64().map(Bind::Int).ok_or_else(invalid),
        FieldType::Float => value.as_f64().map(Bind::Float).ok_or_else(invalid),
        FieldType::String | FieldType::Text => value
            .as_str()
            .map(|s| Bind::Text(s.to_string()))
            .ok_or_else(invalid),
        FieldType::Bool => value.as_bool().map(Bind::Bool).ok_or_else(invalid),
        FieldType::Date => value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(Bind::Date)
            .ok_or_else(invalid),
        FieldType::DateTime => value
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|t| Bind::DateTime(t.with_timezone(&chrono::Utc)))
            .ok_or_else(invalid),
        FieldType::Dropdown | FieldType::DropdownFromSource => Err(CoreError::Internal(
            "dropdown types have no static column".into(),
        )),
    }
}

fn apply_bind<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind: Bind,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    match bind {
        Bind::Json(v) => query.bind(v),
        Bind::Text(s) => query.bind(s),
        Bind::Id(id) => query.bind(id),
        Bind::Int(n) => query.bind(n),
        Bind::Float(f) => query.bind(f),
        Bind::Bool(b) => query.bind(b),
        Bind::Date(d) => query.bind(d),
        Bind::DateTime(t) => query.bind(t),
        Bind::NullText => query.bind(Option::<String>::None),
    }
}

fn apply_query_bind<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    bind: Bind,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match bind {
        Bind::Json(v) => query.bind(v),
        Bind::Text(s) => query.bind(s),
        Bind::Id(id) => query.bind(id),
        Bind::Int(n) => query.bind(n),
        Bind::Float(f) => query.bind(f),
        Bind::Bool(b) => query.bind(b),
        Bind::Date(d) => query.bind(d),
        Bind::DateTime(t) => query.bind(t),
        Bind::NullText => query.bind(Option::<String>::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_predicate_rendering() {
        let pred = Predicate::Eq {
            column: "name".into(),
            value: json!("Alice"),
        };
        let mut binds = Vec::new();
        let sql = render_predicate(&pred, "t", &mut binds).unwrap();
        assert_eq!(sql, "to_jsonb(t.name) = $1::jsonb");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn test_nested_and_or_rendering() {
        let pred = Predicate::And {
            preds: vec![
                Predicate::Gte {
                    column: "salary".into(),
                    value: json!(100),
                },
                Predicate::Or {
                    preds: vec![
                        Predicate::IsNull {
                            column: "end_date".into(),
                        },
                        Predicate::Like {
                            column: "name".into(),
                            pattern: "%x%".into(),
                        },
                    ],
                },
            ],
        };
        let mut binds = Vec::new();
        let sql = render_predicate(&pred, "t", &mut binds).unwrap();
        assert_eq!(
            sql,
            "(to_jsonb(t.salary) >= $1::jsonb AND \
             (t.end_date IS NULL OR t.name::text LIKE $2))"
        );
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn test_dynamic_field_exists_subquery() {
        let pred = Predicate::DynamicField {
            field_id: 5,
            inner: Box::new(Predicate::Gt {
                column: "int_value".into(),
                value: json!(10),
            }),
        };
        let mut binds = Vec::new();
        let sql = render_predicate(&pred, "t", &mut binds).unwrap();
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM dynamic_field_values dfv \
             WHERE dfv.field_id = $1 AND dfv.record_id = t.id \
             AND to_jsonb(dfv.int_value) > $2::jsonb)"
        );
    }

    #[test]
    fn test_unsafe_identifier_rejected() {
        let pred = Predicate::Eq {
            column: "name; DROP TABLE users".into(),
            value: json!(1),
        };
        let mut binds = Vec::new();
        assert!(render_predicate(&pred, "t", &mut binds).is_err());
    }

    #[test]
    fn test_in_list_rendering() {
        let pred = Predicate::In {
            column: "code".into(),
            values: vec![json!("a"), json!("b")],
        };
        let mut binds = Vec::new();
        let sql = render_predicate(&pred, "t", &mut binds).unwrap();
        assert_eq!(sql, "to_jsonb(t.code) IN ($1::jsonb, $2::jsonb)");
    }
}
