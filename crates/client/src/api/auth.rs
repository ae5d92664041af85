//! Session endpoints of the auth service.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::types::{AuthStatus, LoginRequest, LoginResponse};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Ask the auth service who owns the current session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn auth_status(&self) -> Result<AuthStatus, ApiError> {
        self.get_json("auth/status").await
    }

    /// Log in; on success the session cookie is stored in the client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the credentials are rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let body = self.post_json("auth/login", &request).await?;
        Self::parse(&body)
    }

    /// End the session on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty("auth/logout").await.map(|_| ())
    }
}
