//! Plain-text presentation of the session state.

use crate::controller::{Overview, PredictionOutcome};
use crate::form::FormState;
use crate::metrics::{MetricBar, MetricKind};
use crate::models::MetricsSnapshot;
use crate::validation::ValidationErrors;
use chrono::Local;
use std::fmt::Write;

pub const BAR_WIDTH: usize = 30;

/// Share of the bar to fill, in percent.
pub fn bar_fill_percent(value: f64, max: f64) -> f64 {
    if max.is_nan() || max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

pub fn tooltip(bar: &MetricBar) -> String {
    match bar.kind {
        MetricKind::R2 => "Coefficient of Determination".to_string(),
        MetricKind::Mae => format!("Mean Absolute Error: {:.2}", bar.raw),
        MetricKind::Rmse => format!("Root Mean Squared Error: {:.2}", bar.raw),
    }
}

pub fn render_bar(bar: &MetricBar, width: usize) -> String {
    let filled = (bar_fill_percent(bar.value, bar.max) / 100.0 * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "{:<5} [{}{}] {:.3}  ({})",
        bar.kind.label(),
        "█".repeat(filled),
        "░".repeat(width - filled),
        bar.value,
        tooltip(bar)
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `$` plus the amount grouped in thousands, at most two decimals.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return format!("${}", price);
    }
    let fixed = format!("{:.2}", price.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let sign = if price < 0.0 && fixed != "0.00" { "-" } else { "" };
    if fraction.is_empty() {
        format!("{}${}", sign, group_thousands(whole))
    } else {
        format!("{}${}.{}", sign, group_thousands(whole), fraction)
    }
}

pub fn format_trained_at(snapshot: &MetricsSnapshot) -> String {
    snapshot
        .trained_at_utc()
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn render_overview(overview: &Overview) -> String {
    let mut out = String::from("Model Overview\n");

    match &overview.metrics {
        None => out.push_str("Loading metrics…\n"),
        Some(Err(err)) => {
            let _ = writeln!(out, "Failed to load metrics: {}", err);
        }
        Some(Ok(snapshot)) => {
            let status = if snapshot.ready { "Ready" } else { "Not Ready" };
            let model = if snapshot.model_type.trim().is_empty() {
                "N/A"
            } else {
                snapshot.model_type.as_str()
            };
            let _ = writeln!(out, "  Status:     {}", status);
            let _ = writeln!(out, "  Model:      {}", model);
            let _ = writeln!(out, "  Trained At: {}", format_trained_at(snapshot));
        }
    }

    match &overview.health {
        Some(Ok(_)) => out.push_str("Health OK\n"),
        Some(Err(err)) => {
            let _ = writeln!(out, "Health: {}", err);
        }
        None => {}
    }

    if let (Some(snapshot), Some(normalized)) = (overview.snapshot(), overview.normalized()) {
        out.push_str("\nModel Performance\n");
        out.push_str("  Higher is better for R²; lower is better for errors (MAE, RMSE).\n");
        for bar in normalized.bars() {
            let _ = writeln!(out, "  {}", render_bar(&bar, BAR_WIDTH));
        }
        out.push_str("\nFeatures\n  ");
        let pills: Vec<String> = snapshot.features.iter().map(|f| format!("[{}]", f)).collect();
        out.push_str(&pills.join(" "));
        out.push('\n');
    }
    out
}

pub fn render_errors(errors: &ValidationErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {}: {}", field.label(), message);
    }
    out
}

pub fn render_outcome(outcome: &PredictionOutcome) -> String {
    match outcome {
        PredictionOutcome::Predicted(response) => {
            format!("Predicted Price: {}", format_price(response.predicted_price))
        }
        PredictionOutcome::Failed(err) => format!("Error: {}", err),
    }
}

pub fn render_form(form: &FormState, errors: &ValidationErrors) -> String {
    let mut out = String::new();
    for (field, value) in form.iter() {
        let shown = if value.is_empty() { "-" } else { value };
        let _ = write!(out, "  {:<16} {}", field.label(), shown);
        if let Some(options) = field.options() {
            let _ = write!(out, "  ({})", options.join("/"));
        }
        if let Some(message) = errors.get(field) {
            let _ = write!(out, "  <- {}", message);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use crate::errors::Endpoint;
    use crate::form::Field;
    use crate::metrics::normalize;
    use crate::models::{HealthStatus, ModelMetrics, PredictionResponse};

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            ready: true,
            model_type: "RandomForestRegressor".to_string(),
            trained_at: 0.0,
            metrics: ModelMetrics {
                r2: 0.92,
                mae: 1500.0,
                rmse: 2100.0,
            },
            features: vec!["year".to_string(), "engine_cc".to_string()],
        }
    }

    #[test]
    fn test_bar_fill_percent() {
        assert_eq!(bar_fill_percent(0.5, 1.0), 50.0);
        assert_eq!(bar_fill_percent(2.0, 1.0), 100.0);
        assert_eq!(bar_fill_percent(-1.0, 1.0), 0.0);
        assert_eq!(bar_fill_percent(1.0, 0.0), 0.0);
        assert_eq!(bar_fill_percent(f64::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_render_bar() {
        let bars = normalize(&snapshot().metrics);
        let line = render_bar(&bars.rmse, 10);
        assert_eq!(line, "RMSE  [░░░░░░░░░░] 0.000  (Root Mean Squared Error: 2100.00)");
        let line = render_bar(&bars.r2, 10);
        assert!(line.starts_with("R²    [█████████░] 0.920"));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(12345.0), "$12,345");
        assert_eq!(format_price(12345.678), "$12,345.68");
        assert_eq!(format_price(999.5), "$999.5");
        assert_eq!(format_price(1_234_567.0), "$1,234,567");
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(-1500.0), "-$1,500");
    }

    #[test]
    fn test_overview_with_metrics_and_health() {
        let overview = Overview {
            health: Some(Ok(HealthStatus(serde_json::json!({})))),
            metrics: Some(Ok(snapshot())),
        };
        let text = render_overview(&overview);
        assert!(text.contains("Status:     Ready"));
        assert!(text.contains("Trained At: N/A"));
        assert!(text.contains("Health OK"));
        assert!(text.contains("Mean Absolute Error: 1500.00"));
        assert!(text.contains("[year] [engine_cc]"));
    }

    #[test]
    fn test_overview_with_failures() {
        let overview = Overview {
            health: Some(Err(ApiError::transport(Endpoint::Health, "refused"))),
            metrics: Some(Err(ApiError::Service {
                endpoint: Endpoint::Metrics,
                status: 500,
                body: "boom".to_string(),
            })),
        };
        let text = render_overview(&overview);
        assert!(text.contains(
            "Failed to load metrics: Unable to load metrics: Metrics request failed (500): boom"
        ));
        assert!(text.contains("Health: Unable to reach backend: refused"));
        assert!(!text.contains("Model Performance"));
    }

    #[test]
    fn test_render_outcome_and_errors() {
        let outcome = PredictionOutcome::Predicted(PredictionResponse {
            predicted_price: 15000.0,
            inputs: None,
            model_info: None,
        });
        assert_eq!(render_outcome(&outcome), "Predicted Price: $15,000");

        let form = FormState::new().with(Field::Seats, "0");
        let errors = crate::validation::check(&form, 2026);
        let text = render_errors(&errors);
        assert!(text.contains("Seats: Seats must be between 1 and 20"));
        let table = render_form(&form, &errors);
        assert!(table.contains("Fuel Type        -  (Petrol/Diesel/Hybrid/Electric)"));
    }
}
