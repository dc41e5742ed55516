//! Tenantdesk CLI - administration dashboard from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in and check who you are
//! td login -e ops@example.com -p hunter2
//! td whoami
//!
//! # Dashboard overview
//! td dashboard stats
//! td dashboard revenue --period 7d
//!
//! # Manage tenants and storefronts
//! td tenants list --plan pro
//! td storefronts publish 9
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami`, `refresh`, `register` - Session management
//! - `dashboard` - Statistics, activity, health, and charts
//! - `tenants` - Tenant CRUD, stats, and usage
//! - `storefronts` - Storefront CRUD, publishing, theme, and settings
//!
//! Results are printed as JSON on stdout; logs go to stderr.
//!
//! # Environment Variables
//!
//! - `TENANTDESK_API_URL` - API base URL (default: `http://localhost:8000`)
//! - `TENANTDESK_SESSION_FILE` - Where the login is kept between runs
//! - `TENANTDESK_LOG_JSON` - Emit JSON logs when set
//! - `RUST_LOG` - Log filter (default: `tenantdesk=warn`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::Context;
use commands::auth::Registration;
use commands::dashboard::DashboardView;
use commands::storefronts::StorefrontAction;
use commands::tenants::TenantAction;

#[derive(Parser)]
#[command(name = "td")]
#[command(author, version, about = "Tenantdesk administration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the session for later commands
    Login {
        /// Operator email address
        #[arg(short, long)]
        email: String,

        /// Operator password
        #[arg(short, long, env = "TENANTDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session
    Logout,
    /// Show the logged-in operator
    Whoami,
    /// Rotate the bearer token using the refresh token
    Refresh,
    /// Create an operator account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long, env = "TENANTDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Platform statistics, activity, health, and charts
    Dashboard {
        #[command(subcommand)]
        view: DashboardView,
    },
    /// Manage tenants
    Tenants {
        #[command(subcommand)]
        action: TenantAction,
    },
    /// Manage storefronts
    Storefronts {
        #[command(subcommand)]
        action: StorefrontAction,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    // Load .env before reading RUST_LOG / TENANTDESK_LOG_JSON
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tenantdesk=warn,td=warn".into());

    let use_json = std::env::var("TENANTDESK_LOG_JSON").is_ok();
    let json_layer = use_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!use_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::init().await?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, &password).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::Refresh => commands::auth::refresh(&ctx).await?,
        Commands::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            let details = Registration {
                email: &email,
                first_name: &first_name,
                last_name: &last_name,
                password: &password,
            };
            commands::auth::register(&ctx, details).await?;
        }
        Commands::Dashboard { view } => commands::dashboard::run(&ctx, view).await?,
        Commands::Tenants { action } => commands::tenants::run(&ctx, action).await?,
        Commands::Storefronts { action } => commands::storefronts::run(&ctx, action).await?,
    }
    Ok(())
}
