//! API credentials held for the lifetime of one session
//!
//! All five values are secrets. They are wrapped in [`SecretString`] so they
//! are zeroed on drop and never show up in `Debug` output or logs.

use secrecy::{ExposeSecret, SecretString};

/// The five credential strings the API needs for user-context calls
pub struct Credentials {
    bearer_token: SecretString,
    api_key: SecretString,
    api_secret: SecretString,
    access_token: SecretString,
    access_secret: SecretString,
}

impl Credentials {
    pub fn new(
        bearer_token: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            bearer_token: SecretString::from(bearer_token.into()),
            api_key: SecretString::from(api_key.into()),
            api_secret: SecretString::from(api_secret.into()),
            access_token: SecretString::from(access_token.into()),
            access_secret: SecretString::from(access_secret.into()),
        }
    }

    /// Names of fields that are empty or whitespace-only
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("bearer_token", &self.bearer_token),
            ("api_key", &self.api_key),
            ("api_secret", &self.api_secret),
            ("access_token", &self.access_token),
            ("access_secret", &self.access_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.expose_secret().trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn bearer_token(&self) -> &SecretString {
        &self.bearer_token
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn api_secret(&self) -> &SecretString {
        &self.api_secret
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn access_secret(&self) -> &SecretString {
        &self.access_secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_secret", &"[REDACTED]")
            .finish()
    }
}
