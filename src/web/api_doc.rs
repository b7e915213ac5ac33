use utoipa::OpenApi;

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tracker::status,
        super::api::tracker::display,
        super::api::tracker::map,
        super::api::tracker::toggle,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::tracker::TrackerStatus,
            crate::tracker::DisplayState,
            crate::tracker::TrackingIndicator,
            crate::tracker::CyclePhase,
            crate::provider::Position,
            crate::map::SceneSnapshot,
            crate::map::Layer,
            crate::map::MapView,
            crate::map::PathStyle,
        )
    ),
    info(
        title = "ISS Tracker API",
        description = "Live position, display fields and tracking control for the ISS tracker",
        version = "0.1.0"
    ),
    tags(
        (name = "tracker", description = "Tracking state and display")
    )
)]
pub struct ApiDoc;
