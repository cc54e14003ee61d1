//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `account` - Login, registration, profile and order history
//! - `addresses` - Shipping address management
//! - `reviews` - Product reviews
//! - `checkout` - Turning the cart into an order

pub mod account;
pub mod addresses;
pub mod checkout;
pub mod reviews;

pub use account::{AccountError, AccountService};
pub use checkout::{Checkout, CheckoutError, ConfirmOutcome, OrderGateway, OrderReceipt};
