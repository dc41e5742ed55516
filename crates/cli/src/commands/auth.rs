//! Session commands: login, logout, whoami, refresh, register.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password may also come from TENANTDESK_PASSWORD)
//! td login -e ops@example.com -p hunter2
//!
//! # Show the logged-in operator
//! td whoami
//!
//! # Rotate the bearer token
//! td refresh
//!
//! # End the session
//! td logout
//! ```

use serde_json::json;
use tenantdesk_core::{LoginCredentials, RegisterRequest};

use super::{CommandError, Context, print_json};

/// Exchange credentials for a session and print the operator.
///
/// # Errors
///
/// Returns an error if already logged in or the credentials are rejected.
pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<(), CommandError> {
    ctx.require(false).await?;

    let credentials = LoginCredentials {
        email: email.to_owned(),
        password: password.to_owned(),
    };
    let response = ctx.client.auth().login(&credentials).await?;

    tracing::info!("Logged in as {}", response.user.display_name());
    print_json(&json!({
        "user": response.user,
        "tenants": response.tenants,
    }))
}

/// End the session. Local state is cleared even if the server call fails.
///
/// # Errors
///
/// Returns an error if not logged in.
pub async fn logout(ctx: &Context) -> Result<(), CommandError> {
    ctx.require(true).await?;
    ctx.client.auth().logout().await;
    print_json(&json!({ "message": "Logged out" }))
}

/// Print the logged-in operator, as the server currently sees them.
///
/// # Errors
///
/// Returns an error if not logged in or the session was rejected.
pub async fn whoami(ctx: &Context) -> Result<(), CommandError> {
    ctx.require(true).await?;
    let user = ctx.client.auth().current_user().await?;
    print_json(&user)
}

/// Trade the refresh token for a new bearer token.
///
/// # Errors
///
/// Returns an error if not logged in, no refresh token is held, or the
/// server rejects it.
pub async fn refresh(ctx: &Context) -> Result<(), CommandError> {
    ctx.require(true).await?;
    ctx.client.auth().refresh().await?;
    print_json(&json!({ "message": "Token refreshed" }))
}

/// Account details for `td register`.
pub struct Registration<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
}

/// Create an operator account.
///
/// # Errors
///
/// Returns an error if already logged in, the email looks invalid, or the
/// server rejects the registration.
pub async fn register(ctx: &Context, details: Registration<'_>) -> Result<(), CommandError> {
    ctx.require(false).await?;

    // Basic email validation; the server has the final word
    if !details.email.contains('@') {
        return Err(CommandError::InvalidInput(format!(
            "invalid email: {}",
            details.email
        )));
    }

    let request = RegisterRequest {
        email: details.email.to_owned(),
        first_name: details.first_name.to_owned(),
        last_name: details.last_name.to_owned(),
        password: details.password.to_owned(),
        password_confirm: details.password.to_owned(),
    };
    let response = ctx.client.auth().register(&request).await?;
    print_json(&response)
}
