use serde::de::DeserializeOwned;

use super::error::{ProviderError, Service};
use super::types::{GeocodeResponse, HistoricalPosition, Position};
use super::{ReverseGeocoder, SatelliteSource};
use crate::config::ApiConfig;

/// reqwest-backed client for the position and reverse-geocoding services.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    satellite_id: u32,
    geocode_url: String,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("iss-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            satellite_id: config.satellite_id,
            geocode_url: config.geocode_url.clone(),
        })
    }

    pub fn position_url(&self) -> String {
        format!(
            "{}/satellites/{}?units=kilometers",
            self.base_url, self.satellite_id
        )
    }

    pub fn positions_url(&self, timestamps: &[i64]) -> String {
        let csv = timestamps
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/satellites/{}/positions?timestamps={}&units=kilometers",
            self.base_url, self.satellite_id, csv
        )
    }

    pub fn geocode_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}?latitude={}&longitude={}&localityLanguage=en",
            self.geocode_url, latitude, longitude
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: Service,
        url: String,
    ) -> Result<T, ProviderError> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::network(service, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                service,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::network(service, e))?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::parse(service, e))
    }
}

impl SatelliteSource for HttpClient {
    async fn current_position(&self) -> Result<Position, ProviderError> {
        self.get_json(Service::Position, self.position_url()).await
    }

    async fn positions(&self, timestamps: &[i64]) -> Result<Vec<HistoricalPosition>, ProviderError> {
        self.get_json(Service::History, self.positions_url(timestamps))
            .await
    }
}

impl ReverseGeocoder for HttpClient {
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeResponse, ProviderError> {
        self.get_json(Service::Geocode, self.geocode_url(latitude, longitude))
            .await
    }
}
