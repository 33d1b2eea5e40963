//! Voltmart CLI - the storefront and admin console from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in; the session is kept in VOLTMART_SESSION_FILE
//! vm-cli login -e asha@voltmart.in -p 'hunter2!'
//!
//! # Browse the catalog
//! vm-cli products --category Audio --page 2
//!
//! # Work with the cart
//! vm-cli cart add 65f1c0a2
//! vm-cli cart update 65f1c0a2 3
//! vm-cli cart show
//!
//! # Place a cash-on-delivery order for the cart
//! vm-cli checkout --street "12 MG Road" --city Bengaluru --state Karnataka --postal-code 560001
//!
//! # Admin console
//! vm-cli admin dashboard
//! vm-cli admin orders status 66a0be11 shipped
//! ```
//!
//! # Environment Variables
//!
//! - `VOLTMART_API_BASE_URL` - API origin (defaults to the hosted server)
//! - `VOLTMART_SESSION_FILE` - Where the login session is persisted
//! - `VOLTMART_LOG_JSON` - Emit JSON logs instead of text
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Error tracking
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voltmart_storefront::config::StorefrontConfig;
use voltmart_storefront::error::{AppError, Result};

mod commands;
mod render;

use commands::{
    RegisterArgs, AdminSection, CartAction, CheckoutArgs, Context, OrdersAction, ProfileAction,
};

#[derive(Parser)]
#[command(name = "vm-cli")]
#[command(author, version, about = "Voltmart storefront and admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Create a customer account
    Register(RegisterArgs),
    /// Show the logged-in user
    Whoami,
    /// Browse the product catalog
    Products {
        /// Category name or id, or `all`
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Page to show (12 products per page)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart, or for one product with --product
    Checkout(CheckoutArgs),
    /// List or cancel your orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Administration console
    Admin {
        #[command(subcommand)]
        section: AdminSection,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "voltmart_cli=info,voltmart_storefront=info,voltmart_admin=info".into()
    });

    let json = std::env::var_os("VOLTMART_LOG_JSON").is_some();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed before Sentry; report problems without it
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            render::failure(&AppError::from(e));
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        e.report();
        render::failure(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<()> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Login { email, password } => commands::account::login(&ctx, &email, &password).await?,
        Commands::Logout => commands::account::logout(&ctx)?,
        Commands::Register(args) => commands::account::register(&ctx, args).await?,
        Commands::Whoami => commands::account::whoami(&ctx),
        Commands::Products { category, page } => {
            commands::shop::products(&ctx, &category, page).await?;
        }
        Commands::Cart { action } => commands::shop::cart(&ctx, action).await?,
        Commands::Checkout(args) => commands::shop::checkout(&ctx, args).await?,
        Commands::Orders { action } => commands::account::orders(&ctx, action).await?,
        Commands::Profile { action } => commands::account::profile(&ctx, action).await?,
        Commands::Admin { section } => commands::admin::run(&ctx, section).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_online_checkout_requires_payment_id() {
        let parsed = Cli::try_parse_from([
            "vm-cli",
            "checkout",
            "--street",
            "12 MG Road",
            "--city",
            "Bengaluru",
            "--state",
            "Karnataka",
            "--postal-code",
            "560001",
            "--payment",
            "online",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cart_update_accepts_negative_quantity() {
        let parsed = Cli::try_parse_from(["vm-cli", "cart", "update", "p1", "-2"]);
        assert!(parsed.is_ok());
    }
}
