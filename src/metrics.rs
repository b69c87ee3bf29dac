//! Scales model-quality metrics onto a shared [0, 1] bar range.
//!
//! The goodness-of-fit score is already a ratio and is only clamped. The two
//! error magnitudes are measured against the larger of the two (never less
//! than 1) and inverted, so a longer bar is better for every metric. Only the
//! relation between the two errors survives; the raw values travel alongside
//! for labelling.

use crate::models::ModelMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    R2,
    Mae,
    Rmse,
}

impl MetricKind {
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::R2 => "R²",
            MetricKind::Mae => "MAE",
            MetricKind::Rmse => "RMSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBar {
    pub kind: MetricKind,
    /// Bar length in [0, 1].
    pub value: f64,
    /// Scale the bar is measured against.
    pub max: f64,
    /// The metric as reported by the service.
    pub raw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedMetrics {
    pub r2: MetricBar,
    pub mae: MetricBar,
    pub rmse: MetricBar,
    pub error_max: f64,
}

impl NormalizedMetrics {
    pub fn bars(&self) -> [MetricBar; 3] {
        [self.r2, self.mae, self.rmse]
    }
}

fn unit_clamp(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn normalize(metrics: &ModelMetrics) -> NormalizedMetrics {
    let mae = finite_or_zero(metrics.mae);
    let rmse = finite_or_zero(metrics.rmse);
    let error_max = mae.max(rmse).max(1.0);

    let bar = |kind: MetricKind, value: f64, raw: f64| MetricBar {
        kind,
        value,
        max: 1.0,
        raw,
    };

    NormalizedMetrics {
        r2: bar(MetricKind::R2, unit_clamp(metrics.r2), metrics.r2),
        mae: bar(MetricKind::Mae, unit_clamp(1.0 - mae / error_max), metrics.mae),
        rmse: bar(MetricKind::Rmse, unit_clamp(1.0 - rmse / error_max), metrics.rmse),
        error_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertables::*;
    use proptest::prelude::*;

    fn metrics(r2: f64, mae: f64, rmse: f64) -> ModelMetrics {
        ModelMetrics { r2, mae, rmse }
    }

    #[test]
    fn test_reported_metrics_scale() {
        let normalized = normalize(&metrics(0.92, 1500.0, 2100.0));
        assert_eq!(normalized.error_max, 2100.0);
        assert_in_delta!(normalized.r2.value, 0.92, 1e-12);
        assert_in_delta!(normalized.mae.value, 0.2857, 1e-4);
        assert_eq!(normalized.rmse.value, 0.0);
        assert_eq!(normalized.mae.raw, 1500.0);
        assert_eq!(normalized.rmse.raw, 2100.0);
    }

    #[test]
    fn test_zero_errors_are_best_case() {
        let normalized = normalize(&metrics(0.5, 0.0, 0.0));
        assert_eq!(normalized.error_max, 1.0);
        assert_eq!(normalized.mae.value, 1.0);
        assert_eq!(normalized.rmse.value, 1.0);
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(normalize(&metrics(1.2, 1.0, 1.0)).r2.value, 1.0);
        assert_eq!(normalize(&metrics(-0.3, 1.0, 1.0)).r2.value, 0.0);
        assert_eq!(normalize(&metrics(f64::NAN, 1.0, 1.0)).r2.value, 0.0);
        assert_eq!(normalize(&metrics(1.2, 1.0, 1.0)).r2.raw, 1.2);
    }

    #[test]
    fn test_small_errors_use_floor_of_one() {
        let normalized = normalize(&metrics(0.9, 0.25, 0.5));
        assert_eq!(normalized.error_max, 1.0);
        assert_eq!(normalized.mae.value, 0.75);
        assert_eq!(normalized.rmse.value, 0.5);
    }

    #[test]
    fn test_bars_in_display_order() {
        let kinds: Vec<_> = normalize(&metrics(0.9, 1.0, 2.0))
            .bars()
            .iter()
            .map(|bar| bar.kind.label())
            .collect();
        assert_eq!(kinds, vec!["R²", "MAE", "RMSE"]);
    }

    proptest! {
        #[test]
        fn prop_equal_errors_give_equal_bars(error in 0.0f64..1e9, r2 in -1.0f64..2.0) {
            let normalized = normalize(&metrics(r2, error, error));
            prop_assert_eq!(normalized.mae.value, normalized.rmse.value);
        }

        #[test]
        fn prop_bars_stay_in_unit_range(
            r2 in -10.0f64..10.0,
            mae in -1e6f64..1e9,
            rmse in -1e6f64..1e9,
        ) {
            for bar in normalize(&metrics(r2, mae, rmse)).bars() {
                prop_assert!((0.0..=1.0).contains(&bar.value));
                prop_assert_eq!(bar.max, 1.0);
            }
        }
    }
}
