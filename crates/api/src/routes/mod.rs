pub mod health;

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{allocation, finance, project, structure, user};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /projects                       list, create
/// /projects/{id}                  get, update, delete
/// /projects/{id}/approve          approve + capture snapshot (POST)
/// /projects/{id}/state            other lifecycle transitions (POST)
///
/// /projects/{id}/budget           submitted budget (GET, ?year=)
/// /projects/{id}/real-cost        real cost (GET, ?year=&workpackage_id=)
/// /projects/{id}/cost-progress    realized vs projected spend (GET)
/// /projects/{id}/totals           financial indicators (GET, ?year=)
///
/// /allocations                    upsert with validation (PUT), delete (DELETE)
/// /allocations/validate           dry-run validation (POST)
/// /allocations/batch              atomic batch upsert (POST)
/// /users/{id}/allocations         a user's rows for one month (GET)
///
/// /projects/{id}/workpackages     list (GET)
/// /workpackages                   create (POST)
/// /workpackages/{id}              update, delete
/// /workpackages/{id}/tasks        list (GET)
/// /workpackages/{id}/materials    list (GET)
/// /tasks, /tasks/{id}             create / update, delete
/// /materials, /materials/{id}     create / update, delete
/// /users, /users/{id}             staff CRUD
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(project::list).post(project::create))
        .route(
            "/projects/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/projects/{id}/approve", post(project::approve))
        .route("/projects/{id}/state", post(project::transition))
        .route("/projects/{id}/budget", get(finance::submitted_budget))
        .route("/projects/{id}/real-cost", get(finance::real_cost))
        .route("/projects/{id}/cost-progress", get(finance::cost_progress))
        .route("/projects/{id}/totals", get(finance::totals))
        .route(
            "/allocations",
            put(allocation::upsert).delete(allocation::delete),
        )
        .route("/allocations/validate", post(allocation::validate))
        .route("/allocations/batch", post(allocation::batch))
        .route(
            "/users/{id}/allocations",
            get(allocation::list_for_user_month),
        )
        .route(
            "/projects/{id}/workpackages",
            get(structure::list_workpackages),
        )
        .route("/workpackages", post(structure::create_workpackage))
        .route(
            "/workpackages/{id}",
            put(structure::update_workpackage).delete(structure::delete_workpackage),
        )
        .route("/workpackages/{id}/tasks", get(structure::list_tasks))
        .route("/workpackages/{id}/materials", get(structure::list_materials))
        .route("/tasks", post(structure::create_task))
        .route(
            "/tasks/{id}",
            put(structure::update_task).delete(structure::delete_task),
        )
        .route("/materials", post(structure::create_material))
        .route(
            "/materials/{id}",
            put(structure::update_material).delete(structure::delete_material),
        )
        .route("/users", get(user::list).post(user::create))
        .route(
            "/users/{id}",
            get(user::get_by_id).put(user::update).delete(user::delete),
        )
}
