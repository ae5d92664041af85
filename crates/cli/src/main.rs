//! Romanian Football Store CLI - cart, wishlist and stock management.
//!
//! # Usage
//!
//! ```bash
//! # Log in with STORE_EMAIL / STORE_PASSWORD and show who you are
//! fs-cli status
//!
//! # Show the cart, bump a line, add a jersey
//! fs-cli cart list
//! fs-cli cart inc 12
//! fs-cli cart add -p 4 -s L -q 2 --player Hagi --number 10
//! fs-cli cart checkout --coupon HAGI10 --city Bucuresti --street "Bd. Basarabia" \
//!     --number 37 --postal-code 022103
//!
//! # Toggle a product in the wishlist
//! fs-cli wishlist toggle 4
//!
//! # Admin stock management
//! fs-cli stock list --search fcsb
//! fs-cli stock add -p 4 -s XL -q 25
//! fs-cli stock stats
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_API_BASE_URL` - backend base URL (default `http://localhost:8080/api`)
//! - `STORE_EMAIL` / `STORE_PASSWORD` - credentials used to open a session
//! - `SENTRY_DSN` - optional error tracking
//! - `RUST_LOG` - log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use football_store_client::ClientConfig;
use football_store_core::Size;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fs-cli")]
#[command(author, version, about = "Romanian Football Store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with the configured credentials
    Login,
    /// Show the current session
    Status,
    /// End the session on the server
    Logout,
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Manage product stock (admins only)
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and the subtotal
    List,
    /// Add one unit to a line
    Inc { id: i32 },
    /// Remove one unit from a line
    Dec { id: i32 },
    /// Set a line's quantity (1-10)
    Set { id: i32, quantity: i64 },
    /// Remove a line
    Remove { id: i32 },
    /// Put a product in the cart
    Add {
        #[arg(short, long)]
        product: i32,

        #[arg(short, long, default_value = "M")]
        size: Size,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,

        /// Player name to print
        #[arg(long)]
        player: Option<String>,

        /// Shirt number to print
        #[arg(long)]
        number: Option<String>,
    },
    /// Place an order for the cart
    Checkout {
        /// Discount code
        #[arg(long)]
        coupon: Option<String>,

        #[arg(long)]
        city: String,

        #[arg(long)]
        street: String,

        /// Street number
        #[arg(long)]
        number: String,

        #[arg(long)]
        postal_code: String,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List saved products
    List,
    /// Save a product
    Add { product: i32 },
    /// Remove a wishlist entry
    Remove { id: i32 },
    /// Save or unsave a product
    Toggle { product: i32 },
    /// Ask the server whether a product is saved
    Check { product: i32 },
}

#[derive(Subcommand)]
enum StockAction {
    /// List stock rows
    List {
        /// Only rows whose product name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a stock row
    Add {
        #[arg(short, long)]
        product: String,

        #[arg(short, long, default_value = "M")]
        size: Size,

        #[arg(short, long)]
        quantity: String,
    },
    /// Replace a stock row
    Edit {
        id: i32,

        #[arg(short, long)]
        product: Option<String>,

        #[arg(short, long)]
        size: Option<Size>,

        #[arg(short, long)]
        quantity: Option<String>,
    },
    /// Set a row's quantity in place
    Set { id: i32, quantity: u32 },
    /// Delete a stock row
    Delete { id: i32 },
    /// Show stock figures
    Stats,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "football_store_client=info,fs_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::connect(config).await?;

    match cli.command {
        Commands::Login | Commands::Status => commands::account::status(&ctx)?,
        Commands::Logout => commands::account::logout(ctx).await?,
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&ctx).await?,
            CartAction::Inc { id } => commands::cart::increment(&ctx, id.into()).await?,
            CartAction::Dec { id } => commands::cart::decrement(&ctx, id.into()).await?,
            CartAction::Set { id, quantity } => {
                commands::cart::set_quantity(&ctx, id.into(), quantity).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(&ctx, id.into()).await?,
            CartAction::Add {
                product,
                size,
                quantity,
                player,
                number,
            } => {
                let line = football_store_client::AddToCart {
                    product_id: product.into(),
                    size,
                    quantity,
                    player,
                    number,
                };
                commands::cart::add(&ctx, line).await?;
            }
            CartAction::Checkout {
                coupon,
                city,
                street,
                number,
                postal_code,
            } => {
                let address = football_store_client::ShippingAddress {
                    city,
                    street,
                    number,
                    postal_code,
                };
                commands::cart::checkout(&ctx, coupon.as_deref(), &address).await?;
            }
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::wishlist::list(&ctx).await?,
            WishlistAction::Add { product } => {
                commands::wishlist::add(&ctx, product.into()).await?;
            }
            WishlistAction::Remove { id } => commands::wishlist::remove(&ctx, id.into()).await?,
            WishlistAction::Toggle { product } => {
                commands::wishlist::toggle(&ctx, product.into()).await?;
            }
            WishlistAction::Check { product } => {
                commands::wishlist::check(&ctx, product.into()).await?;
            }
        },
        Commands::Stock { action } => match action {
            StockAction::List { search } => commands::stock::list(&ctx, search.as_deref()).await?,
            StockAction::Add {
                product,
                size,
                quantity,
            } => {
                let form = football_store_client::StockForm {
                    product_id: product,
                    size,
                    quantity,
                };
                commands::stock::submit(&ctx, &form, None).await?;
            }
            StockAction::Edit {
                id,
                product,
                size,
                quantity,
            } => {
                let edit = commands::stock::StockEdit {
                    product,
                    size,
                    quantity,
                };
                commands::stock::edit(&ctx, id.into(), edit).await?;
            }
            StockAction::Set { id, quantity } => {
                commands::stock::set_quantity(&ctx, id.into(), quantity).await?;
            }
            StockAction::Delete { id } => commands::stock::delete(&ctx, id.into()).await?,
            StockAction::Stats => commands::stock::stats(&ctx).await?,
        },
    }
    Ok(())
}
