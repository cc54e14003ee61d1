//! Back-office commands.
//!
//! # Usage
//!
//! ```bash
//! # Product catalog
//! moto-cli admin products add -n "Brake pads" -d "Sintered, front" -p 34.90 -s 12 -m 3
//!
//! # Ship an order
//! moto-cli admin orders status 42 shipped
//!
//! # PDF of March's completed orders
//! moto-cli admin orders export --status completed --from 2026-03-01 --to 2026-03-31 -o exports
//! ```
//!
//! Every command here needs an admin session.

use std::path::Path;

use moto_parts_admin::AdminClient;
use moto_parts_admin::orders::OrderFilter;
use moto_parts_core::{OrderId, OrderStatus};
use moto_parts_storefront::AppState;
use moto_parts_storefront::api::{ApiError, Order};
use moto_parts_storefront::guard::View;

use super::{CommandError, require, say};

/// Build the admin client for the current session.
pub fn client(state: &AppState) -> Result<AdminClient, CommandError> {
    require(state.role(), View::AdminDashboard)?;
    Ok(AdminClient::new(state.api().clone(), state.role())?)
}

pub async fn users(client: &AdminClient) -> Result<(), CommandError> {
    for user in client.users().await? {
        say(format_args!(
            "#{:<5} {:<30} {:<30} {}",
            user.id,
            user.full_name(),
            user.email,
            user.role
        ));
    }
    Ok(())
}

pub async fn brands(client: &AdminClient) -> Result<(), CommandError> {
    for brand in client.brands().await? {
        say(format_args!("#{:<5} {}", brand.id, brand.name));
    }
    Ok(())
}

pub async fn models(client: &AdminClient) -> Result<(), CommandError> {
    for model in client.models().await? {
        say(format_args!(
            "#{:<5} {:<20} brand {}",
            model.id,
            model.name,
            model
                .brand_id
                .map_or_else(|| "-".to_string(), |id| id.to_string())
        ));
    }
    Ok(())
}

pub async fn products(client: &AdminClient) -> Result<(), CommandError> {
    for product in client.products().await? {
        say(format_args!(
            "#{:<5} {:<30} {:>10} {:>5} in stock, model {}",
            product.id,
            product.name,
            product.price.to_string(),
            product.stock,
            product
                .model_id
                .map_or_else(|| "-".to_string(), |id| id.to_string())
        ));
    }
    Ok(())
}

pub async fn reviews(client: &AdminClient) -> Result<(), CommandError> {
    for review in client.reviews().await? {
        say(format_args!(
            "#{:<5} product {:<5} user {:<5} {}/5 {}",
            review.id, review.product_id, review.user_id, review.rating, review.comment
        ));
    }
    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

pub async fn orders(client: &AdminClient, filter: &OrderFilter) -> Result<(), CommandError> {
    let orders = client.filtered_orders(filter).await?;
    for order in &orders {
        print_order_row(order);
    }
    say(format_args!("{} order(s)", orders.len()));
    Ok(())
}

pub async fn order_lines(client: &AdminClient, id: OrderId) -> Result<(), CommandError> {
    for line in client.order_lines(id).await? {
        say(format_args!(
            "{:>3} x product {:<5} {:>10} {:>10}",
            line.quantity,
            line.product_id,
            line.unit_price.to_string(),
            line.subtotal.to_string()
        ));
    }
    Ok(())
}

pub async fn update_status(
    client: &AdminClient,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), CommandError> {
    let order = client
        .orders()
        .await?
        .into_iter()
        .find(|o| o.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("orders/{id}")))?;

    let updated = client.update_order_status(&order, status).await?;
    say(format_args!("Order #{} is now {}", updated.id, updated.status));
    Ok(())
}

pub async fn export(
    client: &AdminClient,
    filter: &OrderFilter,
    out: &Path,
) -> Result<(), CommandError> {
    let export = client.export_orders(filter).await?;
    let path = export.write_to(out).await?;
    say(format_args!("Saved {} order(s) to {}", export.orders, path.display()));
    Ok(())
}

fn print_order_row(order: &Order) {
    say(format_args!(
        "#{:<5} user {:<5} {:<16} {:<10} {:>10} {}",
        order.id,
        order.user_id,
        order
            .order_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        order.status,
        order.total_amount.to_string(),
        order.payment_method.label()
    ));
}
