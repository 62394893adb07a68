use axum::{extract::State, Json};
use serde::Deserialize;

use crate::manager::dashboard::DashboardStats;
use crate::manager::notifications::Notification;
use crate::manager::state::ConsoleSnapshot;
use crate::manager::ViewMode;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: ViewMode,
}

/// GET /api/v1/console
pub async fn handle_snapshot(State(state): State<AppState>) -> Json<ConsoleSnapshot> {
    Json(state.applications.snapshot().await)
}

/// PUT /api/v1/console/mode
pub async fn handle_set_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> Json<ConsoleSnapshot> {
    Json(state.applications.set_mode(req.mode).await)
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(state.applications.dashboard().await)
}

/// GET /api/v1/notifications
/// Returns and clears pending notifications.
pub async fn handle_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.applications.drain_notifications().await)
}
