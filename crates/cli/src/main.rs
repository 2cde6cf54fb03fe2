//! Shopfront CLI - drive the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Resolve the tenant for a hostname and show its theme
//! shopfront --hostname acme.shop.example tenant
//!
//! # Browse and fill the cart
//! shopfront products list --category 2
//! shopfront cart add 42 --quantity 2
//! shopfront cart show
//!
//! # Sign in and place the order
//! shopfront login -e ada@example.com -p secret
//! shopfront checkout
//!
//! # Dashboard
//! shopfront admin orders list --status pending
//! ```
//!
//! State (cart, favorites, session) is kept in the file named by
//! `SHOPFRONT_STORAGE_PATH`, so it carries over between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_core::{CategoryId, OrderId, OrderStatus, SubCategoryId};
use shopfront_storefront::StorefrontConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront shell")]
struct Cli {
    /// Hostname to resolve the tenant from (overrides `SHOPFRONT_HOSTNAME`)
    #[arg(long, global = true)]
    hostname: Option<String>,

    /// Prefer dark mode when no choice has been saved
    #[arg(long, global = true)]
    dark: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the tenant and show its theme and render gate
    Tenant,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List categories and subcategories
    Categories {
        /// Only subcategories of this category
        #[arg(long)]
        category: Option<CategoryId>,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Your orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Place an order for the cart
    Checkout,
    /// Dashboard operations (staff only)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally filtered
    List {
        #[arg(long)]
        category: Option<CategoryId>,
        #[arg(long)]
        sub_category: Option<SubCategoryId>,
        /// Case-insensitive search over title, slug and brand
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show one product
    Show { id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a line
    Remove {
        id: String,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Empty the cart
    Clear,
    /// Show lines and the checkout summary
    Show,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Add or remove a product
    Toggle { id: String },
    /// List favorites
    Show,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: OrderId },
    /// Cancel a pending order
    Cancel { id: OrderId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage products
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: AdminOrdersAction,
    },
}

#[derive(Subcommand)]
enum AdminProductsAction {
    /// Create a product
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: String,
        #[arg(long, default_value = "")]
        brand: String,
        #[arg(long)]
        category: Option<CategoryId>,
        #[arg(long)]
        sub_category: Option<SubCategoryId>,
        /// Image files to upload (at most 5)
        #[arg(long = "image")]
        images: Vec<std::path::PathBuf>,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
enum AdminOrdersAction {
    /// List every order
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Search by order id, customer name or email
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Change an order's status
    Status { id: OrderId, status: OrderStatus },
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    let config = match &cli.hostname {
        Some(hostname) => config.with_hostname(hostname),
        None => config,
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=warn,shopfront_storefront=warn,shopfront_admin=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = commands::open_store(&config, cli.dark).await?;

    let result = match cli.command {
        Commands::Tenant => commands::tenant::show(&store).await,
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                sub_category,
                query,
            } => commands::catalog::list(&store, category, sub_category, query.as_deref()).await,
            ProductsAction::Show { id } => commands::catalog::show(&store, &id).await,
        },
        Commands::Categories { category } => commands::catalog::categories(&store, category).await,
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                quantity,
                size,
                color,
            } => commands::cart::add(&store, &id, quantity, size, color).await,
            CartAction::Remove { id, size, color } => {
                commands::cart::remove(&store, &id, size, color).await
            }
            CartAction::Set {
                id,
                quantity,
                size,
                color,
            } => commands::cart::set(&store, &id, quantity, size, color).await,
            CartAction::Clear => commands::cart::clear(&store).await,
            CartAction::Show => commands::cart::show(&store).await,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::Toggle { id } => commands::cart::toggle_favorite(&store, &id).await,
            FavoritesAction::Show => commands::cart::favorites(&store).await,
        },
        Commands::Login { email, password } => {
            commands::account::login(&store, &email, &password).await
        }
        Commands::Register {
            email,
            password,
            name,
            phone,
        } => commands::account::register(&store, &email, &password, &name, &phone).await,
        Commands::Logout => commands::account::logout(&store).await,
        Commands::Whoami => commands::account::whoami(&store).await,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&store).await,
            OrdersAction::Show { id } => commands::orders::show(&store, id).await,
            OrdersAction::Cancel { id } => commands::orders::cancel(&store, id).await,
        },
        Commands::Checkout => commands::orders::checkout(&store).await,
        Commands::Admin { action } => match action {
            AdminAction::Products { action } => match action {
                AdminProductsAction::Create {
                    title,
                    description,
                    price,
                    stock,
                    brand,
                    category,
                    sub_category,
                    images,
                } => {
                    let form = shopfront_admin::ProductForm {
                        title,
                        description,
                        price,
                        stock,
                        brand,
                        category_id: category,
                        sub_category_id: sub_category,
                    };
                    commands::admin::create_product(&store, &form, &images).await
                }
                AdminProductsAction::Delete { id } => {
                    commands::admin::delete_product(&store, &id).await
                }
            },
            AdminAction::Orders { action } => match action {
                AdminOrdersAction::List { status, query } => {
                    commands::admin::list_orders(&store, status, query).await
                }
                AdminOrdersAction::Status { id, status } => {
                    commands::admin::update_order_status(&store, id, status).await
                }
            },
        },
    };

    if let Some(target) = store.take_redirect() {
        tracing::warn!(redirect_to = %target, "Session expired; sign in again");
    }
    result
}
