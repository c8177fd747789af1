//! HTTP-level integration tests for the project lifecycle and the frozen
//! approval snapshot.

mod common;

use axum::http::StatusCode;
use common::{
    as_decimal, body_json, build_test_app, get, post_json, put_json, seed_project, seed_user,
    seed_workpackage,
};
use rust_decimal_macros::dec;
use serde_json::json;
use sqlx::PgPool;

/// Seed a project with one workpackage and a 0.6 allocation for June 2025,
/// then move it to Pending so it is ready for approval.
async fn seed_pending_project(pool: &PgPool) -> (i64, i64, i64) {
    let user = seed_user(pool, "ana@example.org", "3000").await;
    let project = seed_project(pool, "Orion", "1000").await;
    let wp = seed_workpackage(pool, project, "WP1").await;

    let write = put_json(
        build_test_app(pool.clone()),
        "/api/v1/allocations",
        json!({
            "workpackage_id": wp,
            "user_id": user,
            "month": 6,
            "year": 2025,
            "occupancy": "0.6"
        }),
    )
    .await;
    assert_eq!(body_json(write).await["outcome"]["is_valid"], true);

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/state"),
        json!({"state": "pending"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    (user, project, wp)
}

// ---------------------------------------------------------------------------
// Test: approving a pending project freezes the plan
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn approve_pending_project_freezes_the_plan(pool: PgPool) {
    let (_, project, _) = seed_pending_project(&pool).await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/approve"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["state_id"], 3);

    let snapshot = &json["approved_snapshot"];
    let workpackages = snapshot["workpackages"].as_array().unwrap();
    assert_eq!(workpackages.len(), 1);
    assert_eq!(workpackages[0]["resources"].as_array().unwrap().len(), 1);
    assert_eq!(
        as_decimal(&workpackages[0]["resources"][0]["monthly_salary"]),
        dec!(3000)
    );
}

// ---------------------------------------------------------------------------
// Test: approving twice returns 409
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn approving_twice_returns_conflict(pool: PgPool) {
    let (_, project, _) = seed_pending_project(&pool).await;

    let first = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/approve"),
        json!({}),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/approve"),
        json!({}),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Test: a draft project cannot be approved
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn draft_project_cannot_be_approved(pool: PgPool) {
    let project = seed_project(&pool, "Orion", "1000").await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/approve"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: the generic transition endpoint refuses the approved target
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn transition_endpoint_refuses_the_approved_target(pool: PgPool) {
    let (_, project, _) = seed_pending_project(&pool).await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/state"),
        json!({"state": "approved"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: an unknown state name is a validation error
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_state_name_is_a_validation_error(pool: PgPool) {
    let project = seed_project(&pool, "Orion", "1000").await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/state"),
        json!({"state": "galactic"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: allocation writes are frozen once the project is approved
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn allocation_writes_are_frozen_after_approval(pool: PgPool) {
    let (user, project, wp) = seed_pending_project(&pool).await;

    let approve = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/approve"),
        json!({}),
    )
    .await;
    assert_eq!(approve.status(), StatusCode::OK);

    let write = put_json(
        build_test_app(pool.clone()),
        "/api/v1/allocations",
        json!({
            "workpackage_id": wp,
            "user_id": user,
            "month": 7,
            "year": 2025,
            "occupancy": "0.1"
        }),
    )
    .await;
    assert_eq!(write.status(), StatusCode::OK);

    let json = body_json(write).await;
    assert_eq!(json["outcome"]["is_valid"], false);
    assert!(json["outcome"]["message"]
        .as_str()
        .unwrap()
        .contains("frozen"));
}

// ---------------------------------------------------------------------------
// Test: the snapshot budget ignores live edits made after approval
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn snapshot_budget_ignores_later_live_edits(pool: PgPool) {
    let (user, project, wp) = seed_pending_project(&pool).await;

    let approve = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}/approve"),
        json!({}),
    )
    .await;
    assert_eq!(approve.status(), StatusCode::OK);

    // Frozen: 0.6 occupancy at rate 1000.
    let budget = body_json(
        get(
            build_test_app(pool.clone()),
            &format!("/api/v1/projects/{project}/budget"),
        )
        .await,
    )
    .await;
    assert_eq!(budget["mode"], "ETI_SNAPSHOT");
    assert_eq!(as_decimal(&budget["total"]), dec!(600));

    // Mutate the live plan: double the rate, and push the stored occupancy
    // up behind the API's back (the API itself freezes allocation writes
    // once a project is approved).
    let update = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project}"),
        json!({"eti_rate": "2000"}),
    )
    .await;
    assert_eq!(update.status(), StatusCode::OK);

    sqlx::query("UPDATE allocations SET occupancy = 0.9 WHERE workpackage_id = $1 AND user_id = $2")
        .bind(wp)
        .bind(user)
        .execute(&pool)
        .await
        .unwrap();

    // The budget still reads from the frozen plan.
    let after = body_json(
        get(
            build_test_app(pool.clone()),
            &format!("/api/v1/projects/{project}/budget"),
        )
        .await,
    )
    .await;
    assert_eq!(after["mode"], "ETI_SNAPSHOT");
    assert_eq!(as_decimal(&after["total"]), dec!(600));
    assert_eq!(as_decimal(&after["total_occupancy"]), dec!(0.6));
}
