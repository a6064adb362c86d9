//! Request fingerprint derivation.
//!
//! A fingerprint is the idempotency store's primary key. Two policies exist:
//!
//! - [`FingerprintPolicy::Identity`]: the fingerprint is the idempotency key
//!   itself. A retry with a mutated body replays the original outcome.
//! - [`FingerprintPolicy::KeyedHash`]: the fingerprint is a SHA-256 digest of
//!   the namespace, the key, and the canonicalised body, so a mutated body
//!   under a reused key is treated as a distinct request.
//!
//! Both policies are pure and deterministic across process restarts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::IdempotencyKey;

/// Namespace mixed into keyed fingerprints when none is configured.
pub const DEFAULT_FINGERPRINT_NAMESPACE: &str = "mail-gateway:v1";

/// Store key derived from an idempotency key (and optionally the body).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    /// Borrow the fingerprint as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for RequestFingerprint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How fingerprints are derived from incoming requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FingerprintPolicy {
    /// Fingerprint equals the idempotency key.
    #[default]
    Identity,
    /// Fingerprint is a namespaced hash over key and body.
    KeyedHash,
}

impl FingerprintPolicy {
    /// Configuration spelling of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::KeyedHash => "keyed-hash",
        }
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fingerprint policy '{input}': expected identity or keyed-hash")]
pub struct ParseFingerprintPolicyError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for FingerprintPolicy {
    type Err = ParseFingerprintPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "keyed-hash" | "keyed_hash" | "hash" => Ok(Self::KeyedHash),
            _ => Err(ParseFingerprintPolicyError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Derives [`RequestFingerprint`] values under a fixed policy and namespace.
///
/// # Example
///
/// ```
/// # use mail_gateway::domain::{FingerprintPolicy, IdempotencyKey, KeyDeriver};
/// let key = IdempotencyKey::new("abc123").expect("key");
/// let identity = KeyDeriver::new(FingerprintPolicy::Identity, "ns");
/// assert_eq!(identity.derive(&key, b"{}").as_str(), "abc123");
///
/// let hashed = KeyDeriver::new(FingerprintPolicy::KeyedHash, "ns");
/// let a = hashed.derive(&key, br#"{"to":"a@x.com","subject":"Hi"}"#);
/// let b = hashed.derive(&key, br#"{ "subject": "Hi", "to": "a@x.com" }"#);
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    policy: FingerprintPolicy,
    namespace: String,
}

impl KeyDeriver {
    /// Build a deriver for the given policy and namespace.
    pub fn new(policy: FingerprintPolicy, namespace: impl Into<String>) -> Self {
        Self {
            policy,
            namespace: namespace.into(),
        }
    }

    /// Active derivation policy.
    pub fn policy(&self) -> FingerprintPolicy {
        self.policy
    }

    /// Namespace mixed into keyed fingerprints.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Derive the fingerprint for a key and raw request body.
    ///
    /// Never fails: bodies that are not JSON are hashed verbatim.
    pub fn derive(&self, key: &IdempotencyKey, body: &[u8]) -> RequestFingerprint {
        match self.policy {
            FingerprintPolicy::Identity => RequestFingerprint(key.as_ref().to_owned()),
            FingerprintPolicy::KeyedHash => {
                let mut hasher = Sha256::new();
                hasher.update(self.namespace.as_bytes());
                hasher.update([0]);
                hasher.update(key.as_bytes());
                hasher.update([0]);
                hasher.update(canonical_body(body));
                RequestFingerprint(hex::encode(hasher.finalize()))
            }
        }
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(FingerprintPolicy::default(), DEFAULT_FINGERPRINT_NAMESPACE)
    }
}

/// Canonical byte form of a request body.
///
/// JSON bodies have their object keys sorted recursively and are re-encoded
/// compactly; anything else is returned unchanged.
fn canonical_body(body: &[u8]) -> Vec<u8> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => {
            serde_json::to_vec(&canonicalize(&value)).unwrap_or_else(|_| body.to_vec())
        }
        Err(_) => body.to_vec(),
    }
}

/// Recursively sort object keys for canonical JSON representation.
fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| k.as_str());
            let canonical_map: serde_json::Map<String, serde_json::Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            serde_json::Value::Object(canonical_map)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}
