//! Session orchestration: form → validation → conversion → request → service,
//! plus the start-up health and metrics fetch.

use crate::cancel::{CancellationSource, CancellationToken};
use crate::errors::{ApiError, Error};
use crate::form::{Field, FormState};
use crate::gateway::PriceService;
use crate::http::{HttpClient, ReqwestClient};
use crate::logging::*;
use crate::metrics::{NormalizedMetrics, normalize};
use crate::models::{HealthStatus, MetricsSnapshot, PredictionResponse};
use crate::request::build_request;
use crate::units::to_service_units;
use crate::validation::{ValidationErrors, validate};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Invalid,
    Converting,
    Submitting,
    Succeeded,
    Failed,
}

/// Start-up sequence. `initialize` holds the controller for its whole run,
/// so the in-flight phases are only visible through [`PredictionController::init_updates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Idle,
    /// Health check issued.
    FetchingHealth,
    /// Metrics fetch issued too; both are awaited together.
    FetchingMetrics,
    Ready,
    PartiallyFailed,
}

fn publish(slot: &mut InitPhase, updates: &watch::Sender<InitPhase>, phase: InitPhase, log: &Logger) {
    let from = *slot;
    debug!(log, "init phase"; "from" => ?from, "to" => ?phase);
    *slot = phase;
    updates.send_replace(phase);
}

/// Result of the latest submission that got past validation.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Predicted(PredictionResponse),
    Failed(Error),
}

impl PredictionOutcome {
    pub fn price(&self) -> Option<f64> {
        match self {
            PredictionOutcome::Predicted(response) => Some(response.predicted_price),
            PredictionOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            PredictionOutcome::Predicted(_) => None,
            PredictionOutcome::Failed(err) => Some(err),
        }
    }
}

/// Health and metrics as last fetched; each side succeeds or fails alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub health: Option<std::result::Result<HealthStatus, ApiError>>,
    pub metrics: Option<std::result::Result<MetricsSnapshot, ApiError>>,
}

impl Overview {
    pub fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.metrics.as_ref().and_then(|m| m.as_ref().ok())
    }

    pub fn normalized(&self) -> Option<NormalizedMetrics> {
        self.snapshot().map(|snapshot| normalize(&snapshot.metrics))
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.health, Some(Ok(_)))
    }
}

pub struct PredictionController<C = ReqwestClient> {
    service: PriceService<C>,
    form: FormState,
    errors: ValidationErrors,
    outcome: Option<PredictionOutcome>,
    overview: Overview,
    submit_phase: SubmitPhase,
    init_phase: InitPhase,
    init_updates: watch::Sender<InitPhase>,
    teardown: CancellationSource,
}

impl<C> PredictionController<C> {
    pub fn service(&self) -> &PriceService<C> {
        &self.service
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        self.outcome.as_ref()
    }

    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    pub fn submit_phase(&self) -> SubmitPhase {
        self.submit_phase
    }

    pub fn init_phase(&self) -> InitPhase {
        self.init_phase
    }

    /// Follows the start-up sequence from another task while `initialize` runs.
    pub fn init_updates(&self) -> watch::Receiver<InitPhase> {
        self.init_updates.subscribe()
    }

    /// Handle that cancels the start-up flow from elsewhere.
    pub fn teardown_handle(&self) -> CancellationSource {
        self.teardown.clone()
    }

    pub fn teardown(&self) {
        self.teardown.cancel();
    }

    /// User edit. The form persists across submissions until edited again.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
        self.submit_phase = SubmitPhase::Idle;
    }
}

impl<C: HttpClient> PredictionController<C> {
    pub fn new(service: PriceService<C>) -> Self {
        Self::with_form(service, FormState::new())
    }

    pub fn with_form(service: PriceService<C>, form: FormState) -> Self {
        Self {
            service,
            form,
            errors: ValidationErrors::default(),
            outcome: None,
            overview: Overview::default(),
            submit_phase: SubmitPhase::Idle,
            init_phase: InitPhase::Idle,
            init_updates: watch::channel(InitPhase::Idle).0,
            teardown: CancellationSource::new(),
        }
    }

    fn enter(&mut self, phase: SubmitPhase, log: &Logger) {
        debug!(log, "submit phase"; "from" => ?self.submit_phase, "to" => ?phase);
        self.submit_phase = phase;
    }

    /// Health check then metrics fetch. Both are started together and
    /// reported independently. Results are discarded after teardown.
    pub async fn initialize(&mut self) -> InitPhase {
        let log = DEFAULT.new(o!("function" => "PredictionController::initialize"));
        let token = self.teardown.token();
        if token.is_cancelled() {
            info!(log, "already torn down");
            return self.init_phase;
        }

        publish(&mut self.init_phase, &self.init_updates, InitPhase::FetchingHealth, &log);
        let health = self.service.check_health(&token);
        publish(&mut self.init_phase, &self.init_updates, InitPhase::FetchingMetrics, &log);
        let metrics = self.service.fetch_metrics(&token);
        let (health, metrics) = tokio::join!(health, metrics);

        if token.is_cancelled() {
            info!(log, "torn down, dropping results");
            publish(&mut self.init_phase, &self.init_updates, InitPhase::Idle, &log);
            return self.init_phase;
        }

        if let Err(err) = &health {
            warn!(log, "health check failed"; "error" => %err);
        }
        if let Err(err) = &metrics {
            warn!(log, "metrics fetch failed"; "error" => %err);
        }
        let phase = if health.is_ok() && metrics.is_ok() {
            InitPhase::Ready
        } else {
            InitPhase::PartiallyFailed
        };
        publish(&mut self.init_phase, &self.init_updates, phase, &log);
        self.overview = Overview {
            health: Some(health),
            metrics: Some(metrics),
        };
        info!(log, "initialized"; "phase" => ?self.init_phase);
        self.init_phase
    }

    /// One attempt: validate, convert, build, send. Invalid input never
    /// reaches the network. The exclusive borrow keeps attempts from overlapping.
    pub async fn submit(&mut self) -> SubmitPhase {
        let log = DEFAULT.new(o!("function" => "PredictionController::submit"));
        self.outcome = None;

        self.enter(SubmitPhase::Validating, &log);
        let input = match validate(&self.form) {
            Ok(input) => input,
            Err(errors) => {
                info!(log, "rejected"; "invalid_fields" => errors.len());
                self.errors = errors;
                self.enter(SubmitPhase::Invalid, &log);
                return self.submit_phase;
            }
        };
        self.errors = ValidationErrors::default();

        self.enter(SubmitPhase::Converting, &log);
        let units = to_service_units(&input);
        let request = match build_request(&input, &units) {
            Ok(request) => request,
            Err(err) => {
                warn!(log, "request build failed"; "error" => %err);
                self.outcome = Some(PredictionOutcome::Failed(err));
                self.enter(SubmitPhase::Failed, &log);
                return self.submit_phase;
            }
        };
        debug!(log, "request"; "payload" => ?request);

        self.enter(SubmitPhase::Submitting, &log);
        let result = self
            .service
            .submit_prediction(&request, &CancellationToken::none())
            .await;

        match result {
            Ok(response) => {
                info!(log, "predicted"; "price" => response.predicted_price);
                self.outcome = Some(PredictionOutcome::Predicted(response));
                self.enter(SubmitPhase::Succeeded, &log);
            }
            Err(err) => {
                warn!(log, "prediction failed"; "error" => %err);
                self.outcome = Some(PredictionOutcome::Failed(err.into()));
                self.enter(SubmitPhase::Failed, &log);
            }
        }
        self.submit_phase
    }
}

impl<C> Drop for PredictionController<C> {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}
