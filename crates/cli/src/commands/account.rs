//! Session commands.

use std::io::{self, Write};

use super::{CommandError, Context};

/// Print who the session belongs to.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn status(ctx: &Context) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    match ctx.session.user() {
        Some(user) => writeln!(out, "Logged in as {} (#{}, {})", user.email, user.id, user.role)?,
        None => writeln!(out, "Not logged in")?,
    }
    Ok(())
}

/// End the session on the server.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub async fn logout(ctx: Context) -> Result<(), CommandError> {
    let session = ctx.session.logout(&ctx.api).await;
    tracing::info!(authenticated = session.is_authenticated(), "Session closed");
    writeln!(io::stdout().lock(), "Logged out")?;
    Ok(())
}
