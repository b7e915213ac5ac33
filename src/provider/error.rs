use thiserror::Error;

/// Remote service a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Service {
    Position,
    History,
    Geocode,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http client error: {0}")]
    Client(String),
    #[error("{service} request failed: {message}")]
    Network { service: Service, message: String },
    #[error("{service} service returned HTTP {status}")]
    Status { service: Service, status: u16 },
    #[error("malformed {service} response: {message}")]
    Parse { service: Service, message: String },
}

impl ProviderError {
    pub fn network(service: Service, err: reqwest::Error) -> Self {
        ProviderError::Network {
            service,
            message: err.to_string(),
        }
    }

    pub fn parse(service: Service, err: serde_json::Error) -> Self {
        ProviderError::Parse {
            service,
            message: err.to_string(),
        }
    }
}
