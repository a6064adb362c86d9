//! Gateway settings loaded via OrthoConfig.
//!
//! Every field is read from `MAILER_*` environment variables (or the matching
//! CLI flag). Absent values fall back to the accessors' defaults, except the
//! provider key and store, which stay unset so the gateway can start and
//! report the gap per request. The request timeout carries a loader default so
//! an empty environment still yields a settings object.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use mail_gateway::domain::{DEFAULT_FINGERPRINT_NAMESPACE, DEFAULT_SENDER, IdempotencyConfig};
use mail_gateway::outbound::resend::DEFAULT_RESEND_ENDPOINT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Raw configuration values for the gateway process.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MAILER")]
pub struct GatewaySettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// `memory` or a `redis://` / `rediss://` URL.
    pub idempotency_store: Option<String>,
    /// Resend API key.
    pub resend_api_key: Option<String>,
    /// Override for the Resend send endpoint.
    pub resend_endpoint: Option<String>,
    /// Sender used when a request omits `from`.
    pub default_sender: Option<String>,
    /// Namespace mixed into keyed-hash fingerprints.
    pub fingerprint_namespace: Option<String>,
    /// `identity` or `keyed-hash`.
    pub fingerprint_policy: Option<String>,
    /// Prefix for Redis keys; records sit under the bare fingerprint when unset.
    pub redis_key_prefix: Option<String>,
    /// Retention of completed records, in hours.
    pub idempotency_ttl_hours: Option<u64>,
    /// Timeout for provider calls and store connections, in seconds.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("bind_addr", &self.bind_addr)
            .field("idempotency_store", &self.idempotency_store)
            .field("resend_api_key", &self.resend_api_key.as_ref().map(|_| "***"))
            .field("resend_endpoint", &self.resend_endpoint)
            .field("default_sender", &self.default_sender)
            .field("fingerprint_namespace", &self.fingerprint_namespace)
            .field("fingerprint_policy", &self.fingerprint_policy)
            .field("redis_key_prefix", &self.redis_key_prefix)
            .field("idempotency_ttl_hours", &self.idempotency_ttl_hours)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl GatewaySettings {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn resend_endpoint(&self) -> &str {
        self.resend_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_RESEND_ENDPOINT)
    }

    pub fn default_sender(&self) -> &str {
        self.default_sender.as_deref().unwrap_or(DEFAULT_SENDER)
    }

    pub fn fingerprint_namespace(&self) -> &str {
        self.fingerprint_namespace
            .as_deref()
            .unwrap_or(DEFAULT_FINGERPRINT_NAMESPACE)
    }

    pub fn redis_key_prefix(&self) -> &str {
        self.redis_key_prefix.as_deref().unwrap_or_default()
    }

    pub fn idempotency_ttl_hours(&self) -> u64 {
        self.idempotency_ttl_hours
            .unwrap_or(IdempotencyConfig::DEFAULT_TTL_HOURS)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for gateway settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "MAILER_BIND_ADDR",
        "MAILER_IDEMPOTENCY_STORE",
        "MAILER_RESEND_API_KEY",
        "MAILER_RESEND_ENDPOINT",
        "MAILER_DEFAULT_SENDER",
        "MAILER_FINGERPRINT_NAMESPACE",
        "MAILER_FINGERPRINT_POLICY",
        "MAILER_REDIS_KEY_PREFIX",
        "MAILER_IDEMPOTENCY_TTL_HOURS",
        "MAILER_REQUEST_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> GatewaySettings {
        GatewaySettings::load_from_iter([OsString::from("mail-gateway")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.resend_endpoint(), DEFAULT_RESEND_ENDPOINT);
        assert_eq!(settings.default_sender(), DEFAULT_SENDER);
        assert_eq!(settings.fingerprint_namespace(), DEFAULT_FINGERPRINT_NAMESPACE);
        assert_eq!(settings.redis_key_prefix(), "");
        assert_eq!(settings.idempotency_ttl_hours(), 24);
        assert_eq!(settings.request_timeout_secs(), 10);
        assert!(settings.resend_api_key.is_none());
        assert!(settings.idempotency_store.is_none());
        assert!(settings.fingerprint_policy.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("MAILER_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("MAILER_IDEMPOTENCY_STORE", Some("redis://cache:6379".to_owned())),
            ("MAILER_RESEND_API_KEY", Some("re_test".to_owned())),
            ("MAILER_RESEND_ENDPOINT", None),
            ("MAILER_DEFAULT_SENDER", Some("Ops <ops@x.com>".to_owned())),
            ("MAILER_FINGERPRINT_NAMESPACE", Some("tenant-a".to_owned())),
            ("MAILER_FINGERPRINT_POLICY", Some("keyed-hash".to_owned())),
            ("MAILER_REDIS_KEY_PREFIX", Some("mail".to_owned())),
            ("MAILER_IDEMPOTENCY_TTL_HOURS", Some("48".to_owned())),
            ("MAILER_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000");
        assert_eq!(settings.idempotency_store.as_deref(), Some("redis://cache:6379"));
        assert_eq!(settings.resend_api_key.as_deref(), Some("re_test"));
        assert_eq!(settings.default_sender(), "Ops <ops@x.com>");
        assert_eq!(settings.fingerprint_namespace(), "tenant-a");
        assert_eq!(settings.fingerprint_policy.as_deref(), Some("keyed-hash"));
        assert_eq!(settings.redis_key_prefix(), "mail");
        assert_eq!(settings.idempotency_ttl_hours(), 48);
        assert_eq!(settings.request_timeout_secs(), 3);
    }

    #[rstest]
    fn debug_output_masks_api_key() {
        let _guard = lock_env([("MAILER_RESEND_API_KEY", Some("re_secret".to_owned()))]);

        let settings = load_from_empty_args();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("re_secret"));
        assert!(rendered.contains("***"));
    }
}
