use log::{debug, warn};

use crate::provider::{GeocodeResponse, ReverseGeocoder};

pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Turns coordinates into a place name. Never fails: any provider error
/// yields [`UNKNOWN_LOCATION`].
pub struct LocationResolver<G> {
    geocoder: G,
}

impl<G: ReverseGeocoder> LocationResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    pub async fn resolve(&self, latitude: f64, longitude: f64) -> String {
        match self.geocoder.reverse_geocode(latitude, longitude).await {
            Ok(response) => {
                debug!("City: {:?}", response.city);
                location_label(&response)
            }
            Err(e) => {
                warn!("Reverse geocoding failed: {}", e);
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}

/// `"city, region, country"` with absent parts skipped.
pub fn location_label(response: &GeocodeResponse) -> String {
    let parts: Vec<&str> = [response.city(), response.region(), response.country()]
        .into_iter()
        .flatten()
        .collect();

    if parts.is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        parts.join(", ")
    }
}
