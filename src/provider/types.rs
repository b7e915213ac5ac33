use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current state of the satellite as reported by the position service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// km
    pub altitude: f64,
    /// km/h
    pub velocity: f64,
    /// Diameter of the visible ground area, km.
    pub footprint: f64,
    pub visibility: Option<String>,
}

/// One entry of a batched positions response. Other fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HistoricalPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reverse-geocoding response. Every field is optional; the nested
/// `localityInfo` block carries alternates for the top-level names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    pub city: Option<String>,
    pub locality: Option<String>,
    pub principal_subdivision: Option<String>,
    pub country_name: Option<String>,
    pub locality_info: Option<LocalityInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityInfo {
    pub locality: Option<NamedArea>,
    pub principal_subdivision: Option<NamedArea>,
    pub country: Option<NamedArea>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedArea {
    pub name: Option<String>,
}

impl GeocodeResponse {
    pub fn city(&self) -> Option<&str> {
        first_present([
            self.city.as_deref(),
            self.locality.as_deref(),
            self.nested(|info| info.locality.as_ref()),
        ])
    }

    pub fn region(&self) -> Option<&str> {
        first_present([
            self.principal_subdivision.as_deref(),
            self.nested(|info| info.principal_subdivision.as_ref()),
        ])
    }

    pub fn country(&self) -> Option<&str> {
        first_present([
            self.country_name.as_deref(),
            self.nested(|info| info.country.as_ref()),
        ])
    }

    fn nested(&self, pick: fn(&LocalityInfo) -> Option<&NamedArea>) -> Option<&str> {
        self.locality_info
            .as_ref()
            .and_then(pick)
            .and_then(|area| area.name.as_deref())
    }
}

/// First candidate that is present and non-empty, in priority order.
fn first_present<const N: usize>(candidates: [Option<&str>; N]) -> Option<&str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}
