use axum::{extract::State, Json};

use crate::map::SceneSnapshot;
use crate::tracker::{DisplayState, TrackerStatus, TrackingIndicator};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Tracker status", body = TrackerStatus)
    ),
    tag = "tracker"
)]
pub async fn status(State(state): State<AppState>) -> Json<TrackerStatus> {
    Json(state.session.status())
}

#[utoipa::path(
    get,
    path = "/api/display",
    responses(
        (status = 200, description = "Display fields from the latest poll", body = DisplayState),
        (status = 404, description = "No successful poll yet", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn display(State(state): State<AppState>) -> ApiResult<Json<DisplayState>> {
    let display = state.session.lock().display().cloned();
    display
        .map(Json)
        .ok_or(ApiError::NotFound("no_position_yet"))
}

/// Scene for the browser map widget: view, marker, footprint, trail and
/// history layers.
#[utoipa::path(
    get,
    path = "/api/map",
    responses(
        (status = 200, description = "Map view and layers", body = SceneSnapshot)
    ),
    tag = "tracker"
)]
pub async fn map(State(state): State<AppState>) -> Json<SceneSnapshot> {
    Json(state.session.snapshot())
}

#[utoipa::path(
    post,
    path = "/api/tracking/toggle",
    responses(
        (status = 200, description = "Tracking toggled", body = TrackingIndicator)
    ),
    tag = "tracker"
)]
pub async fn toggle(State(state): State<AppState>) -> Json<TrackingIndicator> {
    let indicator = state.session.toggle_tracking();
    log::info!("Tracking {}", indicator.label.to_lowercase());
    Json(indicator)
}
