//! Idempotent email submission.
//!
//! [`SendEmailService`] implements [`SendEmailCommand`]. Per fingerprint it
//! runs the lifecycle unseen → pending (guard held) → completed (persisted),
//! falling back to unseen when the provider rejects the email. Only
//! `completed` records are ever written to the store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{Instrument, debug, error, info, warn};

use super::ports::{
    EmailDispatchError, EmailDispatcher, IdempotencyMetricLabels, IdempotencyMetrics,
    IdempotencyStore, IdempotencyStoreError, NoOpIdempotencyMetrics, SendEmailCommand,
    SendEmailOutcome, SendEmailRequest,
};
use super::{
    Error, IdempotencyConfig, IdempotencyRecord, InFlightGuard, InFlightSet, KeyDeriver,
    OutboundEmail, ProviderCredential, RecordStatus, RequestFingerprint, SendEmailResponse,
    TraceId,
};

/// Runtime dependencies of the service, resolved from configuration.
///
/// `credential` and `store` are optional so that a partially configured
/// deployment still starts and reports the gap on each request.
#[derive(Clone, Default)]
pub struct GatewayConfig {
    /// Provider API key.
    pub credential: Option<ProviderCredential>,
    /// Shared idempotency store.
    pub store: Option<Arc<dyn IdempotencyStore>>,
    /// Fingerprint policy and namespace.
    pub deriver: KeyDeriver,
    /// Retention of completed records.
    pub idempotency: IdempotencyConfig,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("credential", &self.credential)
            .field("store", &self.store.as_ref().map(|_| "configured"))
            .field("deriver", &self.deriver)
            .field("idempotency", &self.idempotency)
            .finish()
    }
}

/// Concrete implementation of [`SendEmailCommand`].
///
/// The in-flight set is injected so that every handler in the process
/// shares one instance.
pub struct SendEmailService {
    config: GatewayConfig,
    dispatcher: Arc<dyn EmailDispatcher>,
    metrics: Arc<dyn IdempotencyMetrics>,
    in_flight: Arc<InFlightSet>,
}

enum Outcome {
    Hit,
    Miss,
    InFlight,
    DispatchFailure,
}

impl SendEmailService {
    /// Create a service with no-op metrics.
    pub fn new(
        config: GatewayConfig,
        dispatcher: Arc<dyn EmailDispatcher>,
        in_flight: Arc<InFlightSet>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            metrics: Arc::new(NoOpIdempotencyMetrics),
            in_flight,
        }
    }

    /// Replace the metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn IdempotencyMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    fn dependencies(&self) -> Result<(&ProviderCredential, &Arc<dyn IdempotencyStore>), Error> {
        let credential = self
            .config
            .credential
            .as_ref()
            .ok_or_else(|| Error::misconfigured("Missing RESEND_API_KEY configuration"))?;
        let store = self
            .config
            .store
            .as_ref()
            .ok_or_else(|| Error::misconfigured("Missing IDEMPOTENCY_STORE configuration"))?;
        Ok((credential, store))
    }

    // Metric failures are logged and swallowed.
    async fn record_outcome(&self, outcome: Outcome) {
        let labels = IdempotencyMetricLabels {
            policy: self.config.deriver.policy().as_str(),
        };
        let result = match outcome {
            Outcome::Hit => self.metrics.record_hit(&labels).await,
            Outcome::Miss => self.metrics.record_miss(&labels).await,
            Outcome::InFlight => self.metrics.record_in_flight(&labels).await,
            Outcome::DispatchFailure => self.metrics.record_dispatch_failure(&labels).await,
        };
        if let Err(err) = result {
            debug!(error = %err, "failed to record idempotency metric");
        }
    }

    /// Dispatch and persist on a separate task that owns the guard.
    ///
    /// A dropped request future cannot interrupt the task, so a delivered
    /// email is always followed by its store write.
    async fn dispatch(
        &self,
        guard: InFlightGuard,
        credential: &ProviderCredential,
        store: &Arc<dyn IdempotencyStore>,
        email: OutboundEmail,
    ) -> Result<SendEmailResponse, Error> {
        let task = DispatchTask {
            guard,
            credential: credential.clone(),
            store: Arc::clone(store),
            dispatcher: Arc::clone(&self.dispatcher),
            email,
            ttl: self.config.idempotency.ttl(),
        };
        let fut = task.run().in_current_span();
        let handle = match TraceId::current() {
            Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, fut)),
            None => tokio::spawn(fut),
        };

        match handle.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                self.record_outcome(Outcome::DispatchFailure).await;
                Err(map_dispatch_error(err))
            }
            Err(join_err) => {
                error!(error = %join_err, "dispatch task aborted");
                Err(Error::internal("Internal server error"))
            }
        }
    }
}

struct DispatchTask {
    guard: InFlightGuard,
    credential: ProviderCredential,
    store: Arc<dyn IdempotencyStore>,
    dispatcher: Arc<dyn EmailDispatcher>,
    email: OutboundEmail,
    ttl: Duration,
}

impl DispatchTask {
    async fn run(self) -> Result<SendEmailResponse, EmailDispatchError> {
        let fingerprint = self.guard.fingerprint();
        let receipt = self.dispatcher.deliver(&self.credential, &self.email).await?;

        let response = response_for(fingerprint, RecordStatus::Completed, &self.email);
        let record = IdempotencyRecord::completed(response.clone());
        match self.store.put(fingerprint, &record, self.ttl).await {
            Ok(()) => info!(
                fingerprint = %fingerprint,
                provider_id = receipt.provider_id.as_deref(),
                "email delivered"
            ),
            // Delivery already happened; the caller still gets the completed response.
            Err(err) => error!(
                fingerprint = %fingerprint,
                provider_id = receipt.provider_id.as_deref(),
                error = %err,
                "email delivered but completion could not be recorded"
            ),
        }
        Ok(response)
    }
}

fn response_for(
    fingerprint: &RequestFingerprint,
    status: RecordStatus,
    email: &OutboundEmail,
) -> SendEmailResponse {
    SendEmailResponse {
        id: fingerprint.to_string(),
        status,
        to: email.to.clone(),
        subject: email.subject.clone(),
    }
}

fn map_store_error(fingerprint: &RequestFingerprint, err: IdempotencyStoreError) -> Error {
    error!(fingerprint = %fingerprint, error = %err, "idempotency store read failed");
    Error::store_unavailable("Internal server error")
}

fn map_dispatch_error(err: EmailDispatchError) -> Error {
    warn!(error = %err, "email dispatch failed");
    Error::dispatch_failed(format!("Error sending email: {err}"))
}

#[async_trait]
impl SendEmailCommand for SendEmailService {
    fn ensure_ready(&self) -> Result<(), Error> {
        self.dependencies().map(|_| ())
    }

    async fn send(&self, request: SendEmailRequest) -> Result<SendEmailOutcome, Error> {
        let (credential, store) = self.dependencies()?;
        let SendEmailRequest {
            idempotency_key,
            body,
            email,
        } = request;
        let fingerprint = self.config.deriver.derive(&idempotency_key, &body);

        let Some(guard) = self.in_flight.acquire(&fingerprint) else {
            debug!(fingerprint = %fingerprint, "fingerprint already in flight");
            self.record_outcome(Outcome::InFlight).await;
            return Ok(SendEmailOutcome::InProgress {
                response: response_for(&fingerprint, RecordStatus::Pending, &email),
            });
        };

        let existing = store
            .get(&fingerprint)
            .await
            .map_err(|err| map_store_error(&fingerprint, err))?;

        if let Some(record) = existing.filter(IdempotencyRecord::is_completed) {
            debug!(fingerprint = %fingerprint, "replaying completed send");
            self.record_outcome(Outcome::Hit).await;
            let response = record
                .response
                .unwrap_or_else(|| response_for(&fingerprint, RecordStatus::Completed, &email));
            return Ok(SendEmailOutcome::Completed {
                response,
                replayed: true,
            });
        }

        self.record_outcome(Outcome::Miss).await;
        let response = self.dispatch(guard, credential, store, email).await?;
        Ok(SendEmailOutcome::Completed {
            response,
            replayed: false,
        })
    }
}

#[cfg(test)]
mod tests;
