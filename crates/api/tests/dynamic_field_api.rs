//! HTTP-level integration tests for dynamic fields, dropdown options, and
//! value storage.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use sqlx::PgPool;
use tempo_db::repositories::{DynamicFieldRepo, DynamicValueRepo};

async fn create_field(pool: &PgPool, entity: &str, title: &str, field_type: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/entities/{entity}/dynamic-fields"),
        serde_json::json!({ "title": title, "field_type": field_type }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_option(pool: &PgPool, field_id: i64, label: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/options"),
        serde_json::json!({ "label": label }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn save_value(pool: &PgPool, field_id: i64, record_id: i64, value: serde_json::Value) {
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/records/{record_id}/value"),
        serde_json::json!({ "value": value }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Field declarations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_and_list_fields(pool: PgPool) {
    create_field(&pool, "project", "Complexity", "int").await;
    create_field(&pool, "project", "Deadline", "date").await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/entities/project/dynamic-fields").await).await;
    let fields = json["data"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["title"], "Complexity");
    assert_eq!(fields[1]["field_type"], "date");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_field_type_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/entities/project/dynamic-fields",
        serde_json::json!({ "title": "Bad", "field_type": "decimal" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_empty_title_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/entities/project/dynamic-fields",
        serde_json::json!({ "title": "", "field_type": "int" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_field_title(pool: PgPool) {
    let id = create_field(&pool, "project", "Complexity", "int").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{id}"),
        serde_json::json!({ "title": "Effort" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Effort");
    // Type is immutable through the update path.
    assert_eq!(json["data"]["field_type"], "int");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_missing_field_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        "/api/v1/dynamic-fields/999",
        serde_json::json!({ "title": "Ghost" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Scalar values
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_value_upsert_keeps_one_row(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Complexity", "int").await;

    save_value(&pool, field_id, 10, serde_json::json!(3)).await;
    save_value(&pool, field_id, 10, serde_json::json!(7)).await;

    let count = DynamicValueRepo::count_for(&pool, field_id, 10).await.unwrap();
    assert_eq!(count, 1);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/records/10/values?entity=project").await).await;
    assert_eq!(json["data"][0]["value"], 7);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_zero_stores_null_on_numeric_field(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Complexity", "int").await;
    save_value(&pool, field_id, 10, serde_json::json!(0)).await;

    let (int_value,): (Option<i64>,) = sqlx::query_as(
        "SELECT int_value FROM dynamic_field_values WHERE field_id = $1 AND record_id = 10",
    )
    .bind(field_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(int_value, None);

    // A null value never resolves.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/records/10/values?entity=project").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_required_field_missing_value_soft_fails(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/entities/project/dynamic-fields",
        serde_json::json!({ "title": "Deadline", "field_type": "date", "required": true }),
    )
    .await;
    let field_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/records/10/value"),
        serde_json::json!({ "value": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["errors"], serde_json::json!(["Deadline is required"]));

    // Nothing was stored.
    let count = DynamicValueRepo::count_for(&pool, field_id, 10).await.unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unparsable_date_soft_fails(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Deadline", "date").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/records/10/value"),
        serde_json::json!({ "value": "not-a-date" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_value_for_missing_field_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        "/api/v1/dynamic-fields/999/records/10/value",
        serde_json::json!({ "value": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Dropdowns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_changing_selection_replaces_not_accumulates(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    let high = create_option(&pool, field_id, "High").await;
    let low = create_option(&pool, field_id, "Low").await;

    save_value(&pool, field_id, 10, serde_json::json!(high)).await;
    save_value(&pool, field_id, 10, serde_json::json!(low)).await;

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM dropdown_selections WHERE field_id = $1 AND record_id = 10",
    )
    .bind(field_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/records/10/values?entity=project").await).await;
    assert_eq!(json["data"][0]["value"], "Low");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_multi_select_labels_joined_in_selection_order(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/entities/project/dynamic-fields",
        serde_json::json!({ "title": "Tags", "field_type": "dropdown", "multiple": true }),
    )
    .await;
    let field_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let urgent = create_option(&pool, field_id, "Urgent").await;
    let internal = create_option(&pool, field_id, "Internal").await;

    save_value(&pool, field_id, 10, serde_json::json!([internal, urgent])).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/records/10/values?entity=project").await).await;
    assert_eq!(json["data"][0]["value"], "Internal, Urgent");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_single_select_rejects_multiple_ids(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    let high = create_option(&pool, field_id, "High").await;
    let low = create_option(&pool, field_id, "Low").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/records/10/value"),
        serde_json::json!({ "value": [low, high] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["errors"], serde_json::json!(["Severity accepts a single option"]));

    // Nothing was stored; a one-element array is still fine.
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM dropdown_selections WHERE field_id = $1 AND record_id = 10",
    )
    .bind(field_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 0);

    save_value(&pool, field_id, 10, serde_json::json!([low])).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_null_selection_clears_value(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    let high = create_option(&pool, field_id, "High").await;

    save_value(&pool, field_id, 10, serde_json::json!(high)).await;
    save_value(&pool, field_id, 10, serde_json::json!(null)).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/records/10/values?entity=project").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_foreign_option_rejected(pool: PgPool) {
    let severity = create_field(&pool, "project", "Severity", "dropdown").await;
    let status = create_field(&pool, "project", "Status", "dropdown").await;
    let foreign = create_option(&pool, status, "Open").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{severity}/records/10/value"),
        serde_json::json!({ "value": foreign }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_scalar_save_on_dropdown_field_rejected(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/records/10/value"),
        serde_json::json!({ "value": "High" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Option management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_options_ordered_and_appended_at_end(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    create_option(&pool, field_id, "High").await;
    create_option(&pool, field_id, "Medium").await;
    create_option(&pool, field_id, "Low").await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/dynamic-fields/{field_id}/options")).await).await;
    let options = json["data"].as_array().unwrap();
    assert_eq!(options[0]["label"], "High");
    assert_eq!(options[2]["label"], "Low");
    assert_eq!(options[2]["ordering"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reorder_rewrites_positions(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    let a = create_option(&pool, field_id, "A").await;
    let b = create_option(&pool, field_id, "B").await;
    let c = create_option(&pool, field_id, "C").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/options/reorder"),
        serde_json::json!({ "option_ids": [c, a, b] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let labels: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["C", "A", "B"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reorder_with_foreign_id_changes_nothing(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    let other = create_field(&pool, "project", "Status", "dropdown").await;
    let a = create_option(&pool, field_id, "A").await;
    let b = create_option(&pool, field_id, "B").await;
    let foreign = create_option(&pool, other, "X").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/options/reorder"),
        serde_json::json!({ "option_ids": [foreign, b, a] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The original order survives.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/dynamic-fields/{field_id}/options")).await).await;
    assert_eq!(json["data"][0]["label"], "A");
    assert_eq!(json["data"][1]["label"], "B");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_deleting_option_removes_its_selections(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    let high = create_option(&pool, field_id, "High").await;
    save_value(&pool, field_id, 10, serde_json::json!(high)).await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/options/{high}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM dropdown_selections WHERE option_id = $1")
            .bind(high)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_options_on_scalar_field_rejected(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Complexity", "int").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/dynamic-fields/{field_id}/options"),
        serde_json::json!({ "label": "High" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Cascade delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_field_delete_cascades_to_all_dependents(pool: PgPool) {
    let scalar = create_field(&pool, "project", "Complexity", "int").await;
    let dropdown = create_field(&pool, "project", "Severity", "dropdown").await;
    let high = create_option(&pool, dropdown, "High").await;

    save_value(&pool, scalar, 10, serde_json::json!(5)).await;
    save_value(&pool, dropdown, 10, serde_json::json!(high)).await;

    for id in [scalar, dropdown] {
        let app = common::build_test_app(pool.clone());
        let response = delete(app, &format!("/api/v1/dynamic-fields/{id}")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    for table in ["dynamic_field_values", "dropdown_options", "dropdown_selections"] {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{table} not emptied");
    }

    // The record surface reflects the removal.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/records/10/values?entity=project").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_failed_cascade_leaves_no_partial_state(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Severity", "dropdown").await;
    let high = create_option(&pool, field_id, "High").await;
    save_value(&pool, field_id, 10, serde_json::json!(high)).await;

    // Make the final statement of the cascade (the field-row delete) fail
    // after the dependent deletes have already run.
    sqlx::query(
        "CREATE FUNCTION refuse_delete() RETURNS trigger AS \
         $$ BEGIN RAISE EXCEPTION 'refused'; END; $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER refuse_field_delete BEFORE DELETE ON dynamic_fields \
         FOR EACH ROW EXECUTE FUNCTION refuse_delete()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = DynamicFieldRepo::delete_cascade(&pool, field_id).await;
    assert!(result.is_err());

    // Everything rolled back: the dependents deleted earlier in the
    // transaction are still there.
    for table in ["dropdown_selections", "dropdown_options", "dynamic_fields"] {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1, "{table} lost rows to a failed cascade");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_field_delete_preserves_permission_rows(pool: PgPool) {
    let field_id = create_field(&pool, "project", "Complexity", "int").await;

    let app = common::build_test_app(pool.clone());
    put_json(
        app,
        "/api/v1/permissions/project",
        serde_json::json!({ "role_id": 1, "field": format!("dyn_{field_id}"), "can_read": true }),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    delete(app, &format!("/api/v1/dynamic-fields/{field_id}")).await;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM field_permissions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_missing_field_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = delete(app, "/api/v1/dynamic-fields/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
