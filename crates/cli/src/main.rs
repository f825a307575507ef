//! E-Shop CLI - Shopping cart front end.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart page (lines and order summary)
//! eshop show
//!
//! # Add two units of a product
//! eshop add --product-id 64f1c2 --name "Desk Lamp" --price 24.99 \
//!     --image https://img.example/lamp.png --category home --quantity 2
//!
//! # Change a quantity, remove a line, or empty the cart
//! eshop update 64f1c2 3
//! eshop remove 64f1c2
//! eshop clear
//!
//! # Place an order for everything in the cart
//! eshop checkout --address "1 Main St" --city Springfield --postal-code 12345 --country US
//! ```
//!
//! Every command loads the cart from the backend before doing anything else.
//! See `eshop_storefront::config` for the environment variables read at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use eshop_core::{Price, ProductId};
use eshop_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod console;

use commands::{AddArgs, CliError, CheckoutArgs};

#[derive(Parser)]
#[command(name = "eshop")]
#[command(author, version, about = "E-Shop cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cart lines and the order summary
    Show,
    /// Print the number of units in the cart
    Count,
    /// Print the cart total
    Total,
    /// Add a product to the cart
    Add {
        /// Product ID
        #[arg(long)]
        product_id: ProductId,

        /// Product display name
        #[arg(long)]
        name: String,

        /// Unit price (e.g. 24.99)
        #[arg(long)]
        price: Price,

        /// Product image URL
        #[arg(long, default_value = "")]
        image: String,

        /// Product category
        #[arg(long, default_value = "")]
        category: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product's line from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (values below 1 are ignored)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove everything from the cart
    Clear,
    /// Place an order for the current cart
    Checkout {
        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        postal_code: String,

        #[arg(long)]
        country: String,
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

fn init_tracing(with_sentry: bool) {
    // Warnings only unless RUST_LOG says otherwise; notifications are printed directly.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eshop=warn,eshop_storefront=warn".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    if with_sentry {
        registry
            .with(sentry_tracing::layer().event_filter(sentry_event_filter))
            .init();
    } else {
        registry.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);
    init_tracing(sentry_guard.is_some());

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let store = commands::open_store(&config).await?;

    match cli.command {
        Commands::Show => commands::cart::show(&store).await,
        Commands::Count => commands::cart::count(&store).await,
        Commands::Total => commands::cart::total(&store).await,
        Commands::Add {
            product_id,
            name,
            price,
            image,
            category,
            quantity,
        } => {
            let args = AddArgs {
                product_id,
                name,
                price,
                image,
                category,
                quantity,
            };
            commands::cart::add(&store, args).await
        }
        Commands::Remove { product_id } => commands::cart::remove(&store, &product_id).await,
        Commands::Update {
            product_id,
            quantity,
        } => commands::cart::update(&store, &product_id, quantity).await,
        Commands::Clear => commands::cart::clear(&store).await,
        Commands::Checkout {
            address,
            city,
            postal_code,
            country,
        } => {
            let args = CheckoutArgs {
                address,
                city,
                postal_code,
                country,
            };
            commands::checkout::place_order(&store, args).await
        }
    }
}
