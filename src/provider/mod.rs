mod client;
mod error;
mod types;

use std::future::Future;

pub use client::HttpClient;
pub use error::ProviderError;
#[cfg(test)]
pub use error::Service;
pub use types::{GeocodeResponse, HistoricalPosition, Position};

/// Source of live and historical satellite positions.
pub trait SatelliteSource: Send + Sync + 'static {
    fn current_position(&self) -> impl Future<Output = Result<Position, ProviderError>> + Send;

    /// Positions at the given unix timestamps, in input order.
    fn positions(
        &self,
        timestamps: &[i64],
    ) -> impl Future<Output = Result<Vec<HistoricalPosition>, ProviderError>> + Send;
}

pub trait ReverseGeocoder: Send + Sync + 'static {
    fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<GeocodeResponse, ProviderError>> + Send;
}
