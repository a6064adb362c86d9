//! Prometheus adapter for idempotency outcomes.
//!
//! # Metric
//!
//! - **Name**: `mail_gateway_idempotency_requests_total`
//! - **Type**: Counter
//! - **Labels**:
//!   - `outcome`: `hit`, `miss`, `in_flight` or `dispatch_failure`
//!   - `policy`: `identity` or `keyed-hash`

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{IdempotencyMetricLabels, IdempotencyMetrics, IdempotencyMetricsError};

/// Prometheus-backed idempotency metrics recorder.
pub struct PrometheusIdempotencyMetrics {
    requests_total: CounterVec,
}

impl PrometheusIdempotencyMetrics {
    /// Create and register the counter with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = CounterVec::new(
            Opts::new(
                "mail_gateway_idempotency_requests_total",
                "Email submissions by idempotency outcome",
            ),
            &["outcome", "policy"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;
        Ok(Self { requests_total })
    }

    fn record(&self, outcome: &str, labels: &IdempotencyMetricLabels) {
        self.requests_total
            .with_label_values(&[outcome, labels.policy])
            .inc();
    }
}

#[async_trait]
impl IdempotencyMetrics for PrometheusIdempotencyMetrics {
    async fn record_hit(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("hit", labels);
        Ok(())
    }

    async fn record_miss(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("miss", labels);
        Ok(())
    }

    async fn record_in_flight(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("in_flight", labels);
        Ok(())
    }

    async fn record_dispatch_failure(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("dispatch_failure", labels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const LABELS: IdempotencyMetricLabels = IdempotencyMetricLabels { policy: "identity" };

    #[test]
    fn registers_counter() {
        let registry = Registry::new();
        PrometheusIdempotencyMetrics::new(&registry).expect("registration succeeds");
        PrometheusIdempotencyMetrics::new(&registry).expect_err("duplicate registration fails");
    }

    #[rstest]
    #[case("hit")]
    #[case("miss")]
    #[case("in_flight")]
    #[case("dispatch_failure")]
    #[tokio::test]
    async fn each_outcome_increments_its_series(#[case] outcome: &str) {
        let registry = Registry::new();
        let metrics = PrometheusIdempotencyMetrics::new(&registry).expect("registration");
        let result = match outcome {
            "hit" => metrics.record_hit(&LABELS).await,
            "miss" => metrics.record_miss(&LABELS).await,
            "in_flight" => metrics.record_in_flight(&LABELS).await,
            _ => metrics.record_dispatch_failure(&LABELS).await,
        };
        result.expect("recording succeeds");

        let counter = metrics
            .requests_total
            .with_label_values(&[outcome, "identity"]);
        assert_eq!(counter.get() as u64, 1);
    }
}
