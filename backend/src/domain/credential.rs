//! Secret used to authenticate against the email provider.

use std::fmt;

use zeroize::Zeroizing;

/// Provider API key, zeroised on drop and redacted from `Debug`.
///
/// # Examples
/// ```
/// use mail_gateway::domain::ProviderCredential;
///
/// let credential = ProviderCredential::new("re_123").expect("non-empty");
/// assert_eq!(credential.expose(), "re_123");
/// assert_eq!(format!("{credential:?}"), "ProviderCredential(***)");
/// assert!(ProviderCredential::new("  ").is_none());
/// ```
#[derive(Clone)]
pub struct ProviderCredential(Zeroizing<String>);

impl ProviderCredential {
    /// Wrap a secret; blank values are treated as absent.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = Zeroizing::new(secret.into());
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Borrow the secret for building an authorisation header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderCredential(***)")
    }
}
