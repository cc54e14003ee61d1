//! Catalog, cart and checkout commands.

use moto_parts_core::{AddressId, BrandId, ModelId, PaymentMethod, ProductId};
use moto_parts_storefront::AppState;
use moto_parts_storefront::api::Product;
use moto_parts_storefront::cart::CartView;
use moto_parts_storefront::error::add_breadcrumb;
use moto_parts_storefront::guard::View;
use moto_parts_storefront::services::ConfirmOutcome;
use moto_parts_storefront::services::reviews::average_rating;

use super::account::print_reviews;
use super::{CommandError, require, say};

// =============================================================================
// Catalog
// =============================================================================

pub async fn brands(state: &AppState) -> Result<(), CommandError> {
    require(state.role(), View::Home)?;

    for brand in state.api().brands().await? {
        say(format_args!("#{:<5} {:<20} {}", brand.id, brand.name, brand.description));
    }
    Ok(())
}

pub async fn models(state: &AppState, brand: Option<BrandId>) -> Result<(), CommandError> {
    require(state.role(), View::Home)?;

    let models = match brand {
        Some(brand) => state.api().models_of_brand(brand).await?,
        None => state.api().models().await?,
    };
    for model in models {
        say(format_args!("#{:<5} {:<20} {}", model.id, model.name, model.description));
    }
    Ok(())
}

pub async fn products(state: &AppState, model: Option<ModelId>) -> Result<(), CommandError> {
    require(state.role(), View::Home)?;

    let products = match model {
        Some(model) => state.api().products_of_model(model).await?,
        None => state.api().products().await?,
    };
    for product in &products {
        print_product_row(product);
    }
    Ok(())
}

pub async fn product(state: &AppState, id: ProductId) -> Result<(), CommandError> {
    require(state.role(), View::Home)?;

    let product = state.api().product(id).await?;
    let reviews = state.api().product_reviews(id).await?;

    say(format_args!("{} ({})", product.name, product.price));
    say(format_args!("  {}", product.description));
    say(format_args!("  in stock: {}", product.stock));
    say(format_args!(
        "  rating:   {:.1} from {} review(s)",
        average_rating(&reviews),
        reviews.len()
    ));
    print_reviews(&reviews);
    Ok(())
}

fn print_product_row(product: &Product) {
    say(format_args!(
        "#{:<5} {:<30} {:>10} {:>5} in stock",
        product.id,
        product.name,
        product.price.to_string(),
        product.stock
    ));
}

// =============================================================================
// Cart
// =============================================================================

/// One cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOp {
    Show,
    Add(ProductId, u32),
    Increment(ProductId),
    Decrement(ProductId),
    Remove(ProductId),
    Clear,
}

pub async fn cart(state: &AppState, op: CartOp) -> Result<(), CommandError> {
    require(state.role(), View::Cart)?;

    let mut cart = state.cart();
    match op {
        CartOp::Show => {}
        CartOp::Add(id, quantity) => {
            let product = state.api().product(id).await?;
            cart.add_or_increment(&product, quantity);
            let product_id = id.to_string();
            add_breadcrumb(
                "cart",
                "Added product",
                Some(&[("product_id", product_id.as_str())]),
            );
        }
        CartOp::Increment(id) => cart.increment(id),
        CartOp::Decrement(id) => cart.decrement(id),
        CartOp::Remove(id) => cart.remove(id),
        CartOp::Clear => cart.clear(),
    }

    print_cart(&CartView::from(cart.lines()));
    Ok(())
}

fn print_cart(view: &CartView) {
    if view.items.is_empty() {
        say("Your cart is empty");
        return;
    }
    for item in &view.items {
        say(format_args!(
            "#{:<5} {:<30} {:>3} x {:>10} = {:>10}",
            item.product_id, item.name, item.quantity, item.price, item.line_price
        ));
    }
    say(format_args!("{} item(s), total {}", view.item_count, view.total));
}

// =============================================================================
// Checkout
// =============================================================================

pub async fn checkout(
    state: &AppState,
    address: AddressId,
    payment: PaymentMethod,
) -> Result<(), CommandError> {
    require(state.role(), View::Checkout)?;

    let mut checkout = state.checkout().await?;
    checkout.select_address(address)?;
    checkout.select_payment(payment);

    let mut cart = state.cart();
    match checkout.confirm(&mut cart).await? {
        ConfirmOutcome::NotReady => say("Your cart is empty; nothing to order"),
        ConfirmOutcome::Ignored => say("This order is already being placed"),
        ConfirmOutcome::Placed(receipt) => {
            state.session().mark_order_created()?;

            say(format_args!(
                "Order #{} placed: {} by {}, delivery on {}",
                receipt.order_id,
                receipt.total,
                payment.label(),
                receipt.delivery_date
            ));
            if receipt.is_partial() {
                say("Some products could not be added to the order:");
                for line in &receipt.failed_lines {
                    say(format_args!(
                        "  product {} x {}: {}",
                        line.product_id, line.quantity, line.error
                    ));
                }
            }
            say(format_args!("Next: {:?}", receipt.redirect));
        }
    }
    Ok(())
}
