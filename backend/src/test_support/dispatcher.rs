//! In-memory email dispatcher that records what it was asked to send.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{DeliveryReceipt, EmailDispatchError, EmailDispatcher};
use crate::domain::{OutboundEmail, ProviderCredential};

/// Dispatcher double counting deliveries.
///
/// Failures can be queued with [`RecordingDispatcher::fail_next`]; each
/// queued failure rejects one delivery with status 500. An optional delay
/// keeps a delivery in flight long enough for concurrent callers to collide.
#[derive(Default)]
pub struct RecordingDispatcher {
    delivered: Mutex<Vec<OutboundEmail>>,
    attempts: AtomicUsize,
    pending_failures: AtomicUsize,
    delay: Option<Duration>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every delivery for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reject the next `count` deliveries.
    pub fn fail_next(&self, count: usize) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Deliveries attempted, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Emails the provider accepted.
    pub fn delivered(&self) -> Vec<OutboundEmail> {
        self.lock_delivered().clone()
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn lock_delivered(&self) -> MutexGuard<'_, Vec<OutboundEmail>> {
        match self.delivered.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("dispatcher mutex"),
        }
    }
}

#[async_trait]
impl EmailDispatcher for RecordingDispatcher {
    async fn deliver(
        &self,
        _credential: &ProviderCredential,
        email: &OutboundEmail,
    ) -> Result<DeliveryReceipt, EmailDispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.take_failure() {
            return Err(EmailDispatchError::rejected(500_u16, "provider unavailable"));
        }
        let mut delivered = self.lock_delivered();
        delivered.push(email.clone());
        Ok(DeliveryReceipt {
            provider_id: Some(format!("re_{}", delivered.len())),
        })
    }
}
