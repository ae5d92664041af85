//! Subcommand implementations.
//!
//! Every command opens its own session: with `STORE_EMAIL` / `STORE_PASSWORD`
//! set it logs in, otherwise it asks the backend whether the cookie jar is
//! still authenticated (it never is in a fresh process, so most commands
//! then stop with a redirect to the login screen).

pub mod account;
pub mod cart;
pub mod stock;
pub mod wishlist;

use std::io::{self, Write};

use football_store_client::{
    ApiClient, ApiError, ClientConfig, Route, Session, Severity, SyncError, SyncEvent,
};
use football_store_core::{Email, EmailError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Api(#[from] ApiError),

    /// A controller operation failed.
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// The configured login email is malformed.
    #[error("Invalid STORE_EMAIL: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The session does not allow this command.
    #[error("Not allowed, go to {0}")]
    Redirect(Route),

    /// Writing to stdout failed.
    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

impl From<Route> for CommandError {
    fn from(route: Route) -> Self {
        Self::Redirect(route)
    }
}

/// API client and session shared by the commands.
pub struct Context {
    pub api: ApiClient,
    pub session: Session,
}

impl Context {
    /// Build the client and open a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the login fails.
    pub async fn connect(config: &ClientConfig) -> Result<Self, CommandError> {
        let api = ApiClient::new(config)?;

        let session = match &config.credentials {
            Some(credentials) => {
                let email = Email::parse(&credentials.email)?;
                Session::login(&api, &email, &credentials.password).await?
            }
            None => Session::restore(&api).await,
        };

        Ok(Self { api, session })
    }
}

/// Print queued notifications and turn a redirect into an error.
///
/// # Errors
///
/// Returns `CommandError::Redirect` when a controller asked for one.
pub fn flush_events(events: Vec<SyncEvent>) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    let mut redirect = None;

    for event in events {
        match event {
            SyncEvent::Notice(notice) => {
                let tag = match notice.severity {
                    Severity::Success => "ok",
                    Severity::Error => "error",
                };
                writeln!(out, "[{tag}] {}", notice.message)?;
            }
            SyncEvent::Redirect(route) => redirect = Some(route),
        }
    }

    redirect.map_or(Ok(()), |route| Err(CommandError::Redirect(route)))
}

/// Finish a controller call: print its events, then surface its error.
///
/// A redirect queued by the controller takes precedence over the error it
/// came with.
///
/// # Errors
///
/// Returns the redirect or the controller error.
pub fn finish<T>(events: Vec<SyncEvent>, result: Result<T, SyncError>) -> Result<T, CommandError> {
    flush_events(events)?;
    Ok(result?)
}
