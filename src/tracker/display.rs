use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::provider::Position;

const NO_VISIBILITY: &str = "--";

/// Text fields shown on the dashboard, all taken from one successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisplayState {
    pub latitude: String,
    pub longitude: String,
    pub altitude: String,
    pub speed: String,
    pub footprint: String,
    pub visibility: String,
    pub location: String,
    pub map_label: String,
    pub updated_at: String,
    pub position: Position,
}

impl DisplayState {
    pub fn new(position: &Position, location: String, now: DateTime<Utc>) -> Self {
        let latitude = format!("{:.2}", position.latitude);
        let longitude = format!("{:.2}", position.longitude);
        let visibility = position
            .visibility
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(NO_VISIBILITY)
            .to_string();

        Self {
            map_label: format!("{} (lat={}, lon={})", location, latitude, longitude),
            altitude: format!("{:.1} km", position.altitude),
            speed: format!("{:.1} km/h", position.velocity),
            footprint: format!("{:.1} km diameter", position.footprint),
            updated_at: format_timestamp(now),
            latitude,
            longitude,
            visibility,
            location,
            position: position.clone(),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS`, UTC.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}
