pub mod applications;
pub mod console;
pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Console view state
        .route("/api/v1/console", get(console::handle_snapshot))
        .route("/api/v1/console/mode", put(console::handle_set_mode))
        .route("/api/v1/dashboard", get(console::handle_dashboard))
        .route("/api/v1/notifications", get(console::handle_notifications))
        // Applications list
        .route("/api/v1/applications", get(applications::handle_list))
        .route(
            "/api/v1/applications/refresh",
            post(applications::handle_refresh),
        )
        .route(
            "/api/v1/applications/filters",
            put(applications::handle_set_filters),
        )
        .route(
            "/api/v1/applications/page",
            put(applications::handle_set_page),
        )
        .route(
            "/api/v1/applications/select-page",
            post(applications::handle_toggle_select_page),
        )
        .route(
            "/api/v1/applications/bulk-delete",
            post(applications::handle_bulk_delete),
        )
        .route(
            "/api/v1/applications/detail",
            delete(applications::handle_close_detail),
        )
        // Single application
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_view).delete(applications::handle_delete),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_status),
        )
        .route(
            "/api/v1/applications/:id/select",
            post(applications::handle_toggle_select),
        )
        .route(
            "/api/v1/applications/:id/resume",
            get(applications::handle_resume_download),
        )
        .route(
            "/api/v1/applications/:id/resume/link",
            get(applications::handle_resume_link),
        )
        .route("/api/v1/applications/:id/call", post(applications::handle_call))
        .route(
            "/api/v1/applications/:id/email",
            post(applications::handle_email),
        )
        .with_state(state)
}
