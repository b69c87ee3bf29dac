use crate::validation::ValidationErrors;
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

/// Remote operations the client performs against the price service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Metrics,
    Predict,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Health => "/",
            Endpoint::Metrics => "/metrics",
            Endpoint::Predict => "/predict",
        }
    }

    fn failure_label(self) -> &'static str {
        match self {
            Endpoint::Health => "Health request failed",
            Endpoint::Metrics => "Metrics request failed",
            Endpoint::Predict => "Prediction failed",
        }
    }

    fn transport_label(self) -> &'static str {
        match self {
            Endpoint::Health => "Unable to reach backend",
            Endpoint::Metrics => "Unable to load metrics",
            Endpoint::Predict => "Unable to get prediction",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Health => "health",
            Endpoint::Metrics => "metrics",
            Endpoint::Predict => "predict",
        };
        write!(f, "{}", name)
    }
}

/// Failure of a single round-trip to the price service.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("{}: {}", .endpoint.transport_label(), service_message(.endpoint, .status, .body))]
    Service {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },
    /// The round-trip did not complete, or its body could not be decoded.
    #[error("{}: {message}", .endpoint.transport_label())]
    Transport { endpoint: Endpoint, message: String },
}

fn service_message(endpoint: &Endpoint, status: &u16, body: &str) -> String {
    let detail = if body.trim().is_empty() {
        reqwest::StatusCode::from_u16(*status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
    } else {
        body
    };
    format!("{} ({}): {}", endpoint.failure_label(), status, detail)
}

impl ApiError {
    pub fn transport(endpoint: Endpoint, message: impl Into<String>) -> Self {
        ApiError::Transport {
            endpoint,
            message: message.into(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiError::Service { endpoint, .. } | ApiError::Transport { endpoint, .. } => *endpoint,
        }
    }

    /// HTTP status of a service error; `None` for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            ApiError::Transport { .. } => None,
        }
    }

    pub fn is_service(&self) -> bool {
        matches!(self, ApiError::Service { .. })
    }
}

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("converted value missing for {0}")]
    MissingConversion(&'static str),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ValidationErrors> for Error {
    fn from(e: ValidationErrors) -> Error {
        Error::Validation(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_carries_status_and_body() {
        let err = ApiError::Service {
            endpoint: Endpoint::Predict,
            status: 500,
            body: "model unavailable".to_string(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "Unable to get prediction: Prediction failed (500): model unavailable"
        );
    }

    #[test]
    fn test_service_error_falls_back_to_reason_phrase() {
        let err = ApiError::Service {
            endpoint: Endpoint::Metrics,
            status: 503,
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to load metrics: Metrics request failed (503): Service Unavailable"
        );
    }

    #[test]
    fn test_transport_error_wraps_message() {
        let err = ApiError::transport(Endpoint::Health, "connection refused");
        assert_eq!(err.status(), None);
        assert!(!err.is_service());
        assert_eq!(err.to_string(), "Unable to reach backend: connection refused");
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Health.path(), "/");
        assert_eq!(Endpoint::Metrics.path(), "/metrics");
        assert_eq!(Endpoint::Predict.path(), "/predict");
    }
}
