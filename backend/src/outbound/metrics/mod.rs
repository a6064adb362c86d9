//! Prometheus-backed metrics adapters, compiled with the `metrics` feature.

mod prometheus_idempotency;

pub use prometheus_idempotency::PrometheusIdempotencyMetrics;
