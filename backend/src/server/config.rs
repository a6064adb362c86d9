//! HTTP server configuration object and helpers.
//!
//! [`ServerConfig::from_settings`] turns raw [`GatewaySettings`] into the
//! explicit dependencies handed to the send-email service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use tracing::warn;
use url::Url;

use mail_gateway::domain::ports::{EmailDispatcher, IdempotencyStore, IdempotencyStoreError};
use mail_gateway::domain::{
    FingerprintPolicy, GatewayConfig, IdempotencyConfig, KeyDeriver, ParseFingerprintPolicyError,
    ProviderCredential,
};
use mail_gateway::outbound::resend::ResendHttpDispatcher;
use mail_gateway::outbound::store::{InMemoryIdempotencyStore, RedisIdempotencyStore};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use super::settings::GatewaySettings;

/// Store selector for a process-local store.
const MEMORY_STORE: &str = "memory";

/// Reasons the settings cannot be turned into a runnable server.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `MAILER_BIND_ADDR` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    /// `MAILER_RESEND_ENDPOINT` is not a URL.
    #[error("invalid Resend endpoint '{value}': {source}")]
    Endpoint {
        value: String,
        source: url::ParseError,
    },
    /// Unknown fingerprint policy name.
    #[error(transparent)]
    Policy(#[from] ParseFingerprintPolicyError),
    /// Store selector is neither `memory` nor a Redis URL.
    #[error("unsupported idempotency store '{value}': expected memory or a redis:// URL")]
    UnsupportedStore { value: String },
    /// Redis URL could not be parsed into a connection manager.
    #[error("idempotency store setup failed: {0}")]
    Store(#[from] IdempotencyStoreError),
    /// The provider HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) gateway: GatewayConfig,
    pub(crate) dispatcher: Arc<dyn EmailDispatcher>,
    pub(crate) default_sender: String,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Resolve settings into adapters and domain configuration.
    ///
    /// A missing API key or store is not an error here; the gateway starts,
    /// fails readiness and answers 500 until configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for values that are present but malformed.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, ConfigError> {
        let bind_addr = settings
            .bind_addr()
            .parse()
            .map_err(|source| ConfigError::BindAddr {
                value: settings.bind_addr().to_owned(),
                source,
            })?;
        let endpoint =
            Url::parse(settings.resend_endpoint()).map_err(|source| ConfigError::Endpoint {
                value: settings.resend_endpoint().to_owned(),
                source,
            })?;
        let timeout = Duration::from_secs(settings.request_timeout_secs().max(1));
        let policy = match settings.fingerprint_policy.as_deref() {
            Some(raw) => raw.parse()?,
            None => FingerprintPolicy::default(),
        };
        let namespace = settings.fingerprint_namespace();

        let credential = settings
            .resend_api_key
            .as_deref()
            .and_then(ProviderCredential::new);
        if credential.is_none() {
            warn!("MAILER_RESEND_API_KEY is not set; email submissions will fail");
        }
        let store = build_store(
            settings.idempotency_store.as_deref(),
            settings.redis_key_prefix(),
            timeout,
        )?;
        if store.is_none() {
            warn!("MAILER_IDEMPOTENCY_STORE is not set; email submissions will fail");
        }

        let gateway = GatewayConfig {
            credential,
            store,
            deriver: KeyDeriver::new(policy, namespace),
            idempotency: IdempotencyConfig::from_hours(settings.idempotency_ttl_hours()),
        };

        Ok(Self {
            bind_addr,
            gateway,
            dispatcher: Arc::new(ResendHttpDispatcher::new(endpoint, timeout)?),
            default_sender: settings.default_sender().to_owned(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

fn build_store(
    selector: Option<&str>,
    key_prefix: &str,
    connection_timeout: Duration,
) -> Result<Option<Arc<dyn IdempotencyStore>>, ConfigError> {
    let Some(selector) = selector.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if selector.eq_ignore_ascii_case(MEMORY_STORE) {
        return Ok(Some(Arc::new(InMemoryIdempotencyStore::new(Arc::new(
            DefaultClock,
        )))));
    }
    if selector.starts_with("redis://") || selector.starts_with("rediss://") {
        let store = RedisIdempotencyStore::connect_lazy(selector, key_prefix, connection_timeout)?;
        return Ok(Some(Arc::new(store)));
    }
    Err(ConfigError::UnsupportedStore {
        value: selector.to_owned(),
    })
}
