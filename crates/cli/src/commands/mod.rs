//! Command implementations.
//!
//! Every command builds a [`Context`] (configuration, client, restored
//! session), passes the route guard, then prints its result as JSON.

pub mod auth;
pub mod dashboard;
pub mod storefronts;
pub mod tenants;

use std::io::{self, Write};

use serde::Serialize;
use tenantdesk_client::{
    ApiError, ClientConfig, ConfigError, GuardDecision, RouteGuard, TenantdeskClient,
};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command needs a session and none is held.
    #[error("Not logged in. Run `td login` first.")]
    NotLoggedIn,

    /// The command is for anonymous use only.
    #[error("Already logged in. Run `td logout` first.")]
    AlreadyLoggedIn,

    /// The persisted session has not been read yet.
    #[error("Session state is still loading")]
    SessionLoading,

    /// Invalid command-line input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// An update command was given no fields to change.
    fn nothing_to_update() -> Self {
        Self::InvalidInput("nothing to update; pass at least one field".to_string())
    }
}

/// Shared state for a single command invocation.
pub struct Context {
    pub client: TenantdeskClient,
    guard: RouteGuard,
}

impl Context {
    /// Load configuration, build the client, and restore the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the client cannot be
    /// built.
    pub async fn init() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        tracing::debug!(api_url = %config.api_url, "Loaded configuration");

        let client = TenantdeskClient::from_config(&config)?;
        client.session().restore().await;

        Ok(Self {
            client,
            guard: RouteGuard::default(),
        })
    }

    /// Run the route guard for a command that requires (or forbids) a
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an error unless the guard says to proceed.
    pub async fn require(&self, require_auth: bool) -> Result<(), CommandError> {
        let snapshot = self.client.session().snapshot().await;
        match self.guard.decide(snapshot, require_auth) {
            GuardDecision::Render => Ok(()),
            GuardDecision::Loading => Err(CommandError::SessionLoading),
            GuardDecision::RedirectToLogin(_) => Err(CommandError::NotLoggedIn),
            GuardDecision::RedirectToLanding(_) => Err(CommandError::AlreadyLoggedIn),
        }
    }
}

/// Pretty-print `value` as JSON on stdout.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized or stdout is closed.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
