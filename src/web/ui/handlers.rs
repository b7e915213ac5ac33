use axum::{extract::State, response::IntoResponse, response::Redirect};

use crate::web::state::AppState;

use super::templates::DashboardTemplate;

pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    DashboardTemplate {
        status: state.session.status(),
        refresh_secs: state.refresh_secs,
    }
}

/// Form target of the dashboard's pause/resume button.
pub async fn toggle(State(state): State<AppState>) -> Redirect {
    let indicator = state.session.toggle_tracking();
    log::info!("Tracking {}", indicator.label.to_lowercase());
    Redirect::to("/")
}
