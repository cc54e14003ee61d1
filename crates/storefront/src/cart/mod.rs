//! Client-side shopping cart.
//!
//! The cart never talks to the store API. It is a list of product snapshots
//! persisted in the session until checkout turns it into an order.
//!
//! - [`CartStore`] owns the lines and persists every mutation
//! - [`totals`] computes subtotals and the grand total
//! - [`CartView`] formats the cart for display

mod store;
pub mod totals;
mod view;

pub use store::{CartPersistence, CartStore, SessionCart};
pub use view::{CartItemView, CartView};

use serde::{Deserialize, Serialize};

use moto_parts_core::{Money, ProductId};

/// One product in the cart.
///
/// Name and price are copied from the product when it is added, so later
/// catalog changes do not alter a cart in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}
