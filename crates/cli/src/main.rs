//! Moto Parts CLI - shop and run the back office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in; the session is kept in MOTO_SESSION_DIR between invocations
//! moto-cli login -e rider@example.com -p 'secret'
//!
//! # Browse and fill the cart
//! moto-cli catalog products --model 3
//! moto-cli cart add 17 --quantity 2
//! moto-cli cart show
//!
//! # Place the order
//! moto-cli checkout --address 5 --payment card
//!
//! # Back office (admin accounts only)
//! moto-cli admin orders export --from 2026-03-01 --to 2026-03-31
//! ```
//!
//! # Environment Variables
//!
//! - `MOTO_API_BASE_URL` - Base URL of the store API (required)
//! - `MOTO_SESSION_DIR` - Session directory (default: `.moto-session`)
//! - `MOTO_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Optional error tracking
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moto_parts_core::{
    AddressId, BrandId, ModelId, OrderId, OrderStatus, PaymentMethod, ProductId, ReviewId, UserId,
};
use moto_parts_storefront::AppState;
use moto_parts_storefront::config::ClientConfig;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "moto-cli")]
#[command(author, version, about = "Moto Parts store client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the cart
    Logout,
    /// Create a customer account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Ask for a password reset email
    ResetPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse brands, models and products
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage your shipping addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place an order for everything in the cart
    Checkout {
        /// Shipping address id (see `addresses list`)
        #[arg(short, long)]
        address: AddressId,
        /// card, paypal, bank-transfer or cash-on-delivery
        #[arg(short, long)]
        payment: PaymentMethod,
    },
    /// Your order history
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Product reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Back-office management (admin only)
    Admin {
        #[command(subcommand)]
        area: AdminArea,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Replace your profile fields
    Update(ProfileArgs),
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    /// Nine digits
    #[arg(long)]
    phone: String,
    /// YYYY-MM-DD
    #[arg(long)]
    birth_date: String,
    /// male or female
    #[arg(long)]
    gender: String,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List brands
    Brands,
    /// List models, optionally of one brand
    Models {
        #[arg(short, long)]
        brand: Option<BrandId>,
    },
    /// List products, optionally for one model
    Products {
        #[arg(short, long)]
        model: Option<ModelId>,
    },
    /// Show one product with its reviews
    Product { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its total
    Show,
    /// Add a product
    Add {
        product: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// One more unit of a product
    Inc { product: ProductId },
    /// One unit less of a product
    Dec { product: ProductId },
    /// Remove a product
    Remove { product: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AddressAction {
    /// List your addresses
    List,
    /// Add an address
    Add(AddressArgs),
    /// Replace an address
    Update {
        id: AddressId,
        #[command(flatten)]
        address: AddressArgs,
    },
    /// Delete an address
    Remove { id: AddressId },
}

#[derive(Args)]
struct AddressArgs {
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    postal_code: String,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Show the lines of one order
    Lines { id: OrderId },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// Reviews of a product
    List { product: ProductId },
    /// Reviews you wrote
    Mine,
    /// Review a product
    Add {
        product: ProductId,
        #[command(flatten)]
        review: ReviewArgs,
    },
    /// Replace one of your reviews
    Edit {
        id: ReviewId,
        product: ProductId,
        #[command(flatten)]
        review: ReviewArgs,
    },
    /// Delete one of your reviews
    Delete { id: ReviewId },
}

#[derive(Args)]
struct ReviewArgs {
    /// 0 to 5 stars
    #[arg(short, long)]
    rating: u8,
    #[arg(short, long)]
    comment: String,
}

#[derive(Subcommand)]
enum AdminArea {
    /// Manage users
    Users {
        #[command(subcommand)]
        action: AdminUserAction,
    },
    /// Manage brands
    Brands {
        #[command(subcommand)]
        action: AdminBrandAction,
    },
    /// Manage models
    Models {
        #[command(subcommand)]
        action: AdminModelAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: AdminProductAction,
    },
    /// Moderate reviews
    Reviews {
        #[command(subcommand)]
        action: AdminReviewAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: AdminOrderAction,
    },
}

#[derive(Subcommand)]
enum AdminUserAction {
    List,
    Update {
        id: UserId,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    Delete {
        id: UserId,
    },
}

#[derive(Args)]
struct NamedArgs {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    description: String,
}

#[derive(Subcommand)]
enum AdminBrandAction {
    List,
    Add(NamedArgs),
    Update {
        id: BrandId,
        #[command(flatten)]
        brand: NamedArgs,
    },
    Delete {
        id: BrandId,
    },
}

#[derive(Args)]
struct ModelArgs {
    #[command(flatten)]
    named: NamedArgs,
    #[arg(short, long)]
    brand: Option<BrandId>,
}

#[derive(Subcommand)]
enum AdminModelAction {
    List,
    Add(ModelArgs),
    Update {
        id: ModelId,
        #[command(flatten)]
        model: ModelArgs,
    },
    Delete {
        id: ModelId,
    },
}

#[derive(Args)]
struct ProductArgs {
    #[command(flatten)]
    named: NamedArgs,
    /// Digits with at most two decimals
    #[arg(short, long)]
    price: String,
    #[arg(short, long, default_value = "0")]
    stock: String,
    #[arg(short, long)]
    model: Option<ModelId>,
}

#[derive(Subcommand)]
enum AdminProductAction {
    List,
    Add(ProductArgs),
    Update {
        id: ProductId,
        #[command(flatten)]
        product: ProductArgs,
    },
    Delete {
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum AdminReviewAction {
    List,
    Delete { id: ReviewId },
}

#[derive(Args)]
struct FilterArgs {
    /// pending, processing, shipped or completed
    #[arg(long)]
    status: Option<OrderStatus>,
    /// First order day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last order day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum AdminOrderAction {
    /// List orders
    List(FilterArgs),
    /// Show the lines of one order
    Lines { id: OrderId },
    /// Change an order's status
    Status { id: OrderId, status: OrderStatus },
    /// Save the selected orders as a PDF document
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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

    Some(guard)
}

/// Map tracing levels to Sentry: warnings and errors become events, the rest
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration errors are reported after logging is up
    let config = ClientConfig::from_env();
    let _sentry = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "moto_parts_storefront=info,moto_parts_admin=info,moto_parts_cli=info".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => match AppState::new(config) {
            Ok(state) => run(&state, cli.command).await,
            Err(e) => Err(CommandError::from(e)),
        },
        Err(e) => Err(CommandError::from(e)),
    };

    if let Err(e) = result {
        e.report();
        std::process::exit(1);
    }
}

async fn run(state: &AppState, command: Commands) -> Result<(), CommandError> {
    match command {
        Commands::Login { email, password } => {
            commands::account::login(state, email, password).await
        }
        Commands::Logout => commands::account::logout(state),
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => commands::account::register(state, first_name, last_name, email, password).await,
        Commands::ResetPassword { email } => commands::account::reset_password(state, &email).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::show_profile(state).await,
            ProfileAction::Update(args) => {
                commands::account::update_profile(state, args.into()).await
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Brands => commands::shop::brands(state).await,
            CatalogAction::Models { brand } => commands::shop::models(state, brand).await,
            CatalogAction::Products { model } => commands::shop::products(state, model).await,
            CatalogAction::Product { id } => commands::shop::product(state, id).await,
        },
        Commands::Cart { action } => {
            let op = match action {
                CartAction::Show => commands::shop::CartOp::Show,
                CartAction::Add { product, quantity } => {
                    commands::shop::CartOp::Add(product, quantity)
                }
                CartAction::Inc { product } => commands::shop::CartOp::Increment(product),
                CartAction::Dec { product } => commands::shop::CartOp::Decrement(product),
                CartAction::Remove { product } => commands::shop::CartOp::Remove(product),
                CartAction::Clear => commands::shop::CartOp::Clear,
            };
            commands::shop::cart(state, op).await
        }
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::account::list_addresses(state).await,
            AddressAction::Add(args) => commands::account::add_address(state, args.into()).await,
            AddressAction::Update { id, address } => {
                commands::account::update_address(state, id, address.into()).await
            }
            AddressAction::Remove { id } => commands::account::remove_address(state, id).await,
        },
        Commands::Checkout { address, payment } => {
            commands::shop::checkout(state, address, payment).await
        }
        Commands::Orders { action } => match action {
            OrderAction::List => commands::account::orders(state).await,
            OrderAction::Lines { id } => commands::account::order_lines(state, id).await,
        },
        Commands::Reviews { action } => match action {
            ReviewAction::List { product } => commands::account::product_reviews(state, product).await,
            ReviewAction::Mine => commands::account::my_reviews(state).await,
            ReviewAction::Add { product, review } => {
                commands::account::post_review(state, review.into_form(product)).await
            }
            ReviewAction::Edit {
                id,
                product,
                review,
            } => commands::account::edit_review(state, id, review.into_form(product)).await,
            ReviewAction::Delete { id } => commands::account::delete_review(state, id).await,
        },
        Commands::Admin { area } => run_admin(state, area).await,
    }
}

async fn run_admin(state: &AppState, area: AdminArea) -> Result<(), CommandError> {
    use commands::admin;

    let client = admin::client(state)?;

    match area {
        AdminArea::Users { action } => match action {
            AdminUserAction::List => admin::users(&client).await,
            AdminUserAction::Update { id, profile } => {
                Ok(client.update_user(id, profile.into()).await?)
            }
            AdminUserAction::Delete { id } => Ok(client.delete_user(id).await?),
        },
        AdminArea::Brands { action } => match action {
            AdminBrandAction::List => admin::brands(&client).await,
            AdminBrandAction::Add(args) => Ok(client.create_brand(args.into()).await?),
            AdminBrandAction::Update { id, brand } => {
                Ok(client.update_brand(id, brand.into()).await?)
            }
            AdminBrandAction::Delete { id } => Ok(client.delete_brand(id).await?),
        },
        AdminArea::Models { action } => match action {
            AdminModelAction::List => admin::models(&client).await,
            AdminModelAction::Add(args) => Ok(client.create_model(args.into()).await?),
            AdminModelAction::Update { id, model } => {
                Ok(client.update_model(id, model.into()).await?)
            }
            AdminModelAction::Delete { id } => Ok(client.delete_model(id).await?),
        },
        AdminArea::Products { action } => match action {
            AdminProductAction::List => admin::products(&client).await,
            AdminProductAction::Add(args) => Ok(client.create_product(args.into()).await?),
            AdminProductAction::Update { id, product } => {
                Ok(client.update_product(id, product.into()).await?)
            }
            AdminProductAction::Delete { id } => Ok(client.delete_product(id).await?),
        },
        AdminArea::Reviews { action } => match action {
            AdminReviewAction::List => admin::reviews(&client).await,
            AdminReviewAction::Delete { id } => Ok(client.delete_review(id).await?),
        },
        AdminArea::Orders { action } => match action {
            AdminOrderAction::List(filter) => admin::orders(&client, &filter.into()).await,
            AdminOrderAction::Lines { id } => admin::order_lines(&client, id).await,
            AdminOrderAction::Status { id, status } => {
                admin::update_status(&client, id, status).await
            }
            AdminOrderAction::Export { filter, out } => {
                admin::export(&client, &filter.into(), &out).await
            }
        },
    }
}

// =============================================================================
// Argument Conversions
// =============================================================================

impl From<ProfileArgs> for moto_parts_storefront::services::account::ProfileForm {
    fn from(args: ProfileArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            birth_date: args.birth_date,
            gender: args.gender,
        }
    }
}

impl From<AddressArgs> for moto_parts_storefront::services::addresses::AddressForm {
    fn from(args: AddressArgs) -> Self {
        Self {
            street: args.street,
            city: args.city,
            country: args.country,
            postal_code: args.postal_code,
        }
    }
}

impl ReviewArgs {
    fn into_form(self, product_id: ProductId) -> moto_parts_storefront::services::reviews::ReviewForm {
        moto_parts_storefront::services::reviews::ReviewForm {
            product_id,
            rating: self.rating,
            comment: self.comment,
        }
    }
}

impl From<NamedArgs> for moto_parts_admin::forms::BrandForm {
    fn from(args: NamedArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
        }
    }
}

impl From<ModelArgs> for moto_parts_admin::forms::ModelForm {
    fn from(args: ModelArgs) -> Self {
        Self {
            name: args.named.name,
            description: args.named.description,
            brand_id: args.brand,
        }
    }
}

impl From<ProductArgs> for moto_parts_admin::forms::ProductForm {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.named.name,
            description: args.named.description,
            price: args.price,
            stock: args.stock,
            model_id: args.model,
        }
    }
}

impl From<FilterArgs> for moto_parts_admin::orders::OrderFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            status: args.status,
            from: args.from,
            to: args.to,
        }
    }
}
