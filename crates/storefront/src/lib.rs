//! Moto Parts storefront library.
//!
//! Customer-facing client of the remote store API: catalog browsing, the
//! session-backed cart, checkout, accounts, addresses and reviews.
//!
//! # Example
//!
//! ```rust,ignore
//! use moto_parts_storefront::{AppState, config::ClientConfig};
//!
//! let state = AppState::new(ClientConfig::from_env()?)?;
//! let mut cart = state.cart();
//! let product = state.api().product(ProductId::new(7)).await?;
//! cart.add_or_increment(&product, 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod services;
pub mod session;
pub mod state;

pub use error::{Error, Result};
pub use state::AppState;
