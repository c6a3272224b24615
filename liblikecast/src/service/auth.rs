//! Authenticated session
//!
//! An [`AuthSession`] exists only once the credentials have been validated
//! with a "who am I" call. It is the single place the rest of the crate gets
//! a transport handle from.

use std::sync::Arc;

use crate::classify::classify;
use crate::config::TwitterConfig;
use crate::credentials::Credentials;
use crate::error::ErrorKind;
use crate::platforms::twitter::TwitterClient;
use crate::platforms::LikeApi;
use crate::types::Identity;

/// Validated credentials plus the identity they belong to
pub struct AuthSession {
    api: Option<Arc<dyn LikeApi>>,
    identity: Identity,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("identity", &self.identity)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl AuthSession {
    /// Authenticate against the Twitter API
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when the API rejects the credentials
    /// - `Transport` for every other failure, including a client that
    ///   cannot be built
    pub async fn authenticate(
        credentials: Credentials,
        config: &TwitterConfig,
    ) -> Result<Self, ErrorKind> {
        let client = TwitterClient::new(credentials, config).map_err(|e| ErrorKind::Transport {
            message: e.message,
            status: e.status,
        })?;
        Self::authenticate_with(Arc::new(client)).await
    }

    /// Authenticate using an already-constructed transport
    pub async fn authenticate_with(api: Arc<dyn LikeApi>) -> Result<Self, ErrorKind> {
        tracing::debug!("Validating credentials against {}", api.name());
        let now = chrono::Utc::now().timestamp();

        match api.get_me().await {
            Ok(identity) => {
                tracing::info!("Authenticated as @{}", identity.username);
                Ok(Self {
                    api: Some(api),
                    identity,
                })
            }
            Err(error) => {
                tracing::warn!("Authentication failed: {}", error);
                Err(match classify(&error, now) {
                    ErrorKind::Unauthorized => ErrorKind::Unauthorized,
                    _ => ErrorKind::Transport {
                        message: format!("Authentication failed: {}", error.message),
                        status: error.status,
                    },
                })
            }
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_valid(&self) -> bool {
        self.api.is_some()
    }

    /// Transport handle for this session
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` once the session has been logged out.
    pub fn transport(&self) -> Result<&dyn LikeApi, ErrorKind> {
        self.api.as_deref().ok_or(ErrorKind::NotAuthenticated)
    }

    /// Drop the transport handle; the session is unusable afterwards
    pub fn logout(&mut self) {
        if self.api.take().is_some() {
            tracing::info!("Logged out @{}", self.identity.username);
        }
    }
}
