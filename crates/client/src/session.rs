//! The authenticated user, as an explicit value.
//!
//! Controllers take the [`CurrentUser`] (or the whole [`Session`]) at
//! construction instead of reading a global, so a controller keyed by owner
//! can only exist once somebody is logged in.

use football_store_core::{Email, Role, UserId};
use secrecy::SecretString;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::api::types::AuthStatus;
use crate::error::SyncError;
use crate::sync::Route;

/// Identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
}

/// Authentication state of the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<CurrentUser>,
}

impl Session {
    /// A session with nobody logged in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session for `user`.
    #[must_use]
    pub const fn authenticated(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The logged-in user, or the route to send an anonymous visitor to.
    ///
    /// # Errors
    ///
    /// Returns [`Route::Login`] when nobody is logged in.
    pub const fn require_user(&self) -> Result<&CurrentUser, Route> {
        match &self.user {
            Some(user) => Ok(user),
            None => Err(Route::Login),
        }
    }

    /// The logged-in admin.
    ///
    /// # Errors
    ///
    /// Returns [`Route::Login`] for anonymous visitors and [`Route::Home`]
    /// for shoppers without the admin role.
    pub const fn require_admin(&self) -> Result<&CurrentUser, Route> {
        match &self.user {
            Some(user) if user.role.is_admin() => Ok(user),
            Some(_) => Err(Route::Home),
            None => Err(Route::Login),
        }
    }

    /// Recover the session from the cookie jar via `GET /auth/status`.
    ///
    /// Any failure yields an anonymous session.
    #[instrument(skip(api))]
    pub async fn restore(api: &ApiClient) -> Self {
        match api.auth_status().await {
            Ok(status) => Self::from_status(status),
            Err(e) => {
                warn!(error = %e, "Failed to check auth status");
                Self::anonymous()
            }
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Operation` when the credentials are rejected.
    #[instrument(skip(api, password), fields(email = %email))]
    pub async fn login(
        api: &ApiClient,
        email: &Email,
        password: &SecretString,
    ) -> Result<Self, SyncError> {
        let response = api.login(email.as_str(), password).await?;
        info!(user_id = %response.id, role = %response.role, "Logged in");
        Ok(Self::authenticated(CurrentUser {
            id: response.id,
            email: response.email,
            role: response.role,
        }))
    }

    /// Log out. The returned session is anonymous even if the call fails.
    #[instrument(skip(self, api))]
    pub async fn logout(self, api: &ApiClient) -> Self {
        if let Err(e) = api.logout().await {
            warn!(error = %e, "Logout request failed");
        }
        Self::anonymous()
    }

    fn from_status(status: AuthStatus) -> Self {
        if !status.authenticated {
            return Self::anonymous();
        }
        match (status.id, status.email, status.role) {
            (Some(id), Some(email), Some(role)) => {
                Self::authenticated(CurrentUser { id, email, role })
            }
            _ => {
                warn!("Auth status reported authenticated without a full identity");
                Self::anonymous()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            email: Email::parse("fan@example.ro").unwrap(),
            role,
        }
    }

    #[test]
    fn test_require_user() {
        assert_eq!(Session::anonymous().require_user(), Err(Route::Login));
        let session = Session::authenticated(user(Role::User));
        assert_eq!(session.require_user().unwrap().id, UserId::new(7));
    }

    #[test]
    fn test_require_admin() {
        assert_eq!(Session::anonymous().require_admin(), Err(Route::Login));
        assert_eq!(
            Session::authenticated(user(Role::User)).require_admin(),
            Err(Route::Home)
        );
        assert!(
            Session::authenticated(user(Role::Admin))
                .require_admin()
                .is_ok()
        );
    }

    #[test]
    fn test_from_status_requires_full_identity() {
        let partial = AuthStatus {
            authenticated: true,
            id: Some(UserId::new(1)),
            email: None,
            role: Some(Role::User),
        };
        assert!(!Session::from_status(partial).is_authenticated());

        let full = AuthStatus {
            authenticated: true,
            id: Some(UserId::new(1)),
            email: Some(Email::parse("a@b.ro").unwrap()),
            role: Some(Role::Admin),
        };
        let session = Session::from_status(full);
        assert_eq!(session.user().unwrap().role, Role::Admin);
    }
}
