use crate::cancel::CancellationToken;
use crate::config;
use crate::errors::{ApiError, Endpoint};
use crate::http::{HttpClient, HttpRequest, ReqwestClient};
use crate::logging::*;
use crate::models::{HealthStatus, MetricsSnapshot, PredictionResponse};
use crate::request::PredictionRequest;
use serde::de::DeserializeOwned;
use std::time::Instant;

const CANCELLED: &str = "request cancelled";

/// Client side of the price service. One call per operation, no retries.
pub struct PriceService<C = ReqwestClient> {
    client: C,
    base_url: String,
}

impl PriceService<ReqwestClient> {
    pub fn new_with_url(base_url: impl Into<String>) -> Self {
        Self::with_client(ReqwestClient::default(), base_url)
    }

    /// Base address and timeout taken from the environment and config file.
    pub fn from_config() -> crate::errors::Result<Self> {
        let timeout = config::request_timeout()?;
        Ok(Self::with_client(
            ReqwestClient::new(timeout),
            config::backend_base_url(),
        ))
    }
}

impl<C: HttpClient> PriceService<C> {
    pub fn with_client(client: C, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn call<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: HttpRequest,
        token: &CancellationToken,
    ) -> std::result::Result<R, ApiError> {
        let log = DEFAULT.new(o!(
            "function" => "PriceService::call",
            "endpoint" => endpoint.to_string(),
            "url" => request.url.clone(),
        ));
        if token.is_cancelled() {
            info!(log, "skipped, already cancelled");
            return Err(ApiError::transport(endpoint, CANCELLED));
        }

        info!(log, "calling");
        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(log, "cancelled in flight");
                return Err(ApiError::transport(endpoint, CANCELLED));
            }
            outcome = self.client.send(request) => outcome,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = outcome.map_err(|message| {
            warn!(log, "transport failure"; "error" => %message, "elapsed_ms" => elapsed_ms);
            ApiError::transport(endpoint, message)
        })?;
        if token.is_cancelled() {
            info!(log, "response dropped after cancellation"; "status" => response.status);
            return Err(ApiError::transport(endpoint, CANCELLED));
        }
        info!(log, "responded"; "status" => response.status, "elapsed_ms" => elapsed_ms);

        if !response.is_success() {
            warn!(log, "service error"; "status" => response.status, "body" => %response.body);
            return Err(ApiError::Service {
                endpoint,
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            warn!(log, "malformed response"; "error" => %e);
            ApiError::transport(endpoint, format!("malformed response body: {}", e))
        })
    }

    pub async fn check_health(
        &self,
        token: &CancellationToken,
    ) -> std::result::Result<HealthStatus, ApiError> {
        let request = HttpRequest::get(self.url(Endpoint::Health));
        self.call(Endpoint::Health, request, token).await
    }

    pub async fn fetch_metrics(
        &self,
        token: &CancellationToken,
    ) -> std::result::Result<MetricsSnapshot, ApiError> {
        let request = HttpRequest::get(self.url(Endpoint::Metrics));
        self.call(Endpoint::Metrics, request, token).await
    }

    pub async fn submit_prediction(
        &self,
        payload: &PredictionRequest,
        token: &CancellationToken,
    ) -> std::result::Result<PredictionResponse, ApiError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| ApiError::transport(Endpoint::Predict, e.to_string()))?;
        let request = HttpRequest::post_json(self.url(Endpoint::Predict), body);
        self.call(Endpoint::Predict, request, token).await
    }
}

#[cfg(test)]
mod tests;
