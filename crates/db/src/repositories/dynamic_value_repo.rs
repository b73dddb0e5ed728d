//! Repository for the `dynamic_field_values` table (scalar EAV rows).
//!
//! The table carries no uniqueness constraint on (field_id, record_id);
//! the at-most-one-row rule is maintained procedurally by the
//! lookup-then-write upsert below, run inside a transaction.

use chrono::NaiveDate;
use sqlx::PgPool;
use tempo_core::dynamic::ScalarValue;
use tempo_core::types::{DbId, Timestamp};

use crate::models::dynamic_field_value::DynamicFieldValue;

const COLUMNS: &str = "id, field_id, record_id, int_value, float_value, string_value, \
                       text_value, date_value, datetime_value, created_at, updated_at";

/// The six typed columns, split out of an optional scalar for binding.
type SplitScalar = (
    Option<i64>,
    Option<f64>,
    Option<String>,
    Option<String>,
    Option<NaiveDate>,
    Option<Timestamp>,
);

fn split(value: Option<ScalarValue>) -> SplitScalar {
    match value {
        None => (None, None, None, None, None, None),
        Some(ScalarValue::Int(n)) => (Some(n), None, None, None, None, None),
        Some(ScalarValue::Bool(b)) => (Some(i64::from(b)), None, None, None, None, None),
        Some(ScalarValue::Float(f)) => (None, Some(f), None, None, None, None),
        Some(ScalarValue::String(s)) => (None, None, Some(s), None, None, None),
        Some(ScalarValue::Text(s)) => (None, None, None, Some(s), None, None),
        Some(ScalarValue::Date(d)) => (None, None, None, None, Some(d), None),
        Some(ScalarValue::DateTime(t)) => (None, None, None, None, None, Some(t)),
    }
}

/// Provides data access for scalar dynamic-field values.
pub struct DynamicValueRepo;

impl DynamicValueRepo {
    /// Upsert the value for one (field, record): look up the existing row,
    /// update it if found, insert otherwise. All six typed columns are
    /// written so a stale column can never survive a value change.
    pub async fn upsert(
        pool: &PgPool,
        field_id: DbId,
        record_id: DbId,
        value: Option<ScalarValue>,
    ) -> Result<DynamicFieldValue, sqlx::Error> {
        let (int_v, float_v, string_v, text_v, date_v, datetime_v) = split(value);

        let mut tx = pool.begin().await?;

        let existing: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM dynamic_field_values \
             WHERE field_id = $1 AND record_id = $2 \
             LIMIT 1",
        )
        .bind(field_id)
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match existing {
            Some((id,)) => {
                let query = format!(
                    "UPDATE dynamic_field_values SET \
                        int_value = $2, float_value = $3, string_value = $4, \
                        text_value = $5, date_value = $6, datetime_value = $7, \
                        updated_at = now() \
                     WHERE id = $1 \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, DynamicFieldValue>(&query)
                    .bind(id)
                    .bind(int_v)
                    .bind(float_v)
                    .bind(string_v)
                    .bind(text_v)
                    .bind(date_v)
                    .bind(datetime_v)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let query = format!(
                    "INSERT INTO dynamic_field_values \
                        (field_id, record_id, int_value, float_value, string_value, \
                         text_value, date_value, datetime_value) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, DynamicFieldValue>(&query)
                    .bind(field_id)
                    .bind(record_id)
                    .bind(int_v)
                    .bind(float_v)
                    .bind(string_v)
                    .bind(text_v)
                    .bind(date_v)
                    .bind(datetime_v)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(row)
    }

    /// All scalar value rows for one record, across fields.
    pub async fn list_for_record(
        pool: &PgPool,
        record_id: DbId,
    ) -> Result<Vec<DynamicFieldValue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dynamic_field_values WHERE record_id = $1 ORDER BY field_id"
        );
        sqlx::query_as::<_, DynamicFieldValue>(&query)
            .bind(record_id)
            .fetch_all(pool)
            .await
    }

    /// Count rows for one (field, record). Test support for the
    /// no-duplicates guarantee.
    pub async fn count_for(
        pool: &PgPool,
        field_id: DbId,
        record_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM dynamic_field_values WHERE field_id = $1 AND record_id = $2",
        )
        .bind(field_id)
        .bind(record_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
