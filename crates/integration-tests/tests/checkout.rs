//! Checkout against the fake store API.
//!
//! Run with: cargo test -p moto-parts-integration-tests --test checkout

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::json;

use moto_parts_core::{AddressId, Money, OrderId, PaymentMethod, ProductId};
use moto_parts_integration_tests::{CUSTOMER_PASSWORD, FakeStore, TestServer};
use moto_parts_storefront::AppState;
use moto_parts_storefront::guard::View;
use moto_parts_storefront::services::account::{AccountError, LoginForm};
use moto_parts_storefront::services::checkout::CheckoutState;
use moto_parts_storefront::services::{CheckoutError, ConfirmOutcome};

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

async fn signed_in_customer(server: &TestServer) -> AppState {
    let state = server.state();
    state
        .account()
        .login(&LoginForm {
            email: "marta@example.com".to_string(),
            password: SecretString::from(CUSTOMER_PASSWORD.to_string()),
        })
        .await
        .unwrap();
    state
}

/// Two brake pads and one chain kit: 2 x 12.50 + 89.90.
async fn fill_cart(state: &AppState) {
    let mut cart = state.cart();
    let pads = state.api().product(ProductId::new(1)).await.unwrap();
    let chain = state.api().product(ProductId::new(2)).await.unwrap();
    cart.add_or_increment(&pads, 2);
    cart.add_or_increment(&chain, 1);
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_checkout_submits_header_then_lines_and_clears_cart() {
    let server = TestServer::start(FakeStore::seeded()).await;
    let state = signed_in_customer(&server).await;
    fill_cart(&state).await;

    let mut checkout = state.checkout().await.unwrap();
    assert_eq!(checkout.addresses().len(), 1);
    checkout.select_address(AddressId::new(5)).unwrap();
    checkout.select_payment(PaymentMethod::Card);

    let mut cart = state.cart();
    assert!(checkout.can_confirm(&cart));

    let outcome = checkout.confirm_on(&mut cart, march(10)).await.unwrap();
    let ConfirmOutcome::Placed(receipt) = outcome else {
        panic!("expected a placed order, got {outcome:?}");
    };

    assert_eq!(receipt.total, Money::from_cents(11490));
    assert_eq!(receipt.delivery_date, march(17));
    assert_eq!(receipt.submitted, vec![ProductId::new(1), ProductId::new(2)]);
    assert!(!receipt.is_partial());
    assert_eq!(receipt.redirect, View::Home);

    let headers = server.store().requests_to("POST", "/orders");
    assert_eq!(headers.len(), 1);
    let header = &headers[0].body;
    assert_eq!(header["userId"], json!(1));
    assert_eq!(header["status"], json!("pending"));
    assert_eq!(header["paymentMethod"], json!("card"));
    assert_eq!(header["deliveryDate"], json!("2026-03-17"));
    assert_eq!(header["shippingAddress"], json!("Gran Via 4, Bilbao, Spain, 48001"));
    assert_eq!(header["totalAmount"].as_f64(), Some(114.9));

    let lines = server.store().requests_to("POST", "/order-lines");
    let sent: Vec<(i64, i64, u64)> = lines
        .iter()
        .map(|r| {
            (
                r.body["orderId"].as_i64().unwrap(),
                r.body["productId"].as_i64().unwrap(),
                r.body["quantity"].as_u64().unwrap(),
            )
        })
        .collect();
    let order_id = receipt.order_id.as_i64();
    assert_eq!(sent, vec![(order_id, 1, 2), (order_id, 2, 1)]);

    assert!(cart.is_empty());
    assert!(state.cart().is_empty(), "cleared cart must be persisted");
    assert_eq!(checkout.state(), CheckoutState::Succeeded);
}

#[tokio::test]
async fn test_second_confirm_after_success_sends_nothing() {
    let server = TestServer::start(FakeStore::seeded()).await;
    let state = signed_in_customer(&server).await;
    fill_cart(&state).await;

    let mut checkout = state.checkout().await.unwrap();
    checkout.select_address(AddressId::new(5)).unwrap();
    checkout.select_payment(PaymentMethod::Paypal);

    let mut cart = state.cart();
    checkout.confirm_on(&mut cart, march(10)).await.unwrap();
    fill_cart(&state).await;
    let mut cart = state.cart();

    let again = checkout.confirm_on(&mut cart, march(10)).await.unwrap();

    assert_eq!(again, ConfirmOutcome::Ignored);
    assert_eq!(server.store().count("POST", "/orders"), 1);
    assert!(!cart.is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_rejected_line_is_reported_and_order_still_placed() {
    let store = FakeStore::seeded();
    store.with(|data| {
        data.reject_lines_for.insert(ProductId::new(2));
    });
    let server = TestServer::start(store).await;
    let state = signed_in_customer(&server).await;
    fill_cart(&state).await;

    let mut checkout = state.checkout().await.unwrap();
    checkout.select_address(AddressId::new(5)).unwrap();
    checkout.select_payment(PaymentMethod::BankTransfer);

    let mut cart = state.cart();
    let ConfirmOutcome::Placed(receipt) = checkout.confirm_on(&mut cart, march(1)).await.unwrap()
    else {
        panic!("expected a placed order");
    };

    assert!(receipt.is_partial());
    assert_eq!(receipt.submitted, vec![ProductId::new(1)]);
    assert_eq!(receipt.failed_lines.len(), 1);
    assert_eq!(receipt.failed_lines[0].product_id, ProductId::new(2));
    assert_eq!(receipt.failed_lines[0].quantity, 1);

    assert_eq!(server.store().count("POST", "/order-lines"), 2);
    let stored_lines = server.store().with(|data| {
        data.order_lines
            .iter()
            .filter(|(id, _)| *id == receipt.order_id)
            .count()
    });
    assert_eq!(stored_lines, 1);
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_rejected_header_keeps_cart_and_retry_creates_order() {
    let store = FakeStore::seeded();
    store.with(|data| data.reject_orders = true);
    let server = TestServer::start(store).await;
    let state = signed_in_customer(&server).await;
    fill_cart(&state).await;

    let mut checkout = state.checkout().await.unwrap();
    checkout.select_address(AddressId::new(5)).unwrap();
    checkout.select_payment(PaymentMethod::CashOnDelivery);

    let mut cart = state.cart();
    let err = checkout.confirm_on(&mut cart, march(10)).await.unwrap_err();

    assert!(matches!(err, CheckoutError::OrderRejected(_)));
    assert_eq!(checkout.state(), CheckoutState::Failed);
    assert_eq!(server.store().count("POST", "/order-lines"), 0);
    assert_eq!(state.cart().lines().len(), 2);

    server.store().with(|data| data.reject_orders = false);
    let outcome = checkout.confirm_on(&mut cart, march(10)).await.unwrap();

    assert!(matches!(outcome, ConfirmOutcome::Placed(_)));
    assert_eq!(server.store().count("POST", "/orders"), 2);
    assert!(state.cart().is_empty());
}

#[tokio::test]
async fn test_empty_cart_is_not_ready() {
    let server = TestServer::start(FakeStore::seeded()).await;
    let state = signed_in_customer(&server).await;

    let mut checkout = state.checkout().await.unwrap();
    checkout.select_address(AddressId::new(5)).unwrap();
    checkout.select_payment(PaymentMethod::Card);

    let mut cart = state.cart();
    let outcome = checkout.confirm_on(&mut cart, march(10)).await.unwrap();

    assert_eq!(outcome, ConfirmOutcome::NotReady);
    assert_eq!(server.store().count("POST", "/orders"), 0);
}

#[tokio::test]
async fn test_address_of_another_user_is_refused() {
    let server = TestServer::start(FakeStore::seeded()).await;
    let state = signed_in_customer(&server).await;

    let mut checkout = state.checkout().await.unwrap();

    assert!(matches!(
        checkout.select_address(AddressId::new(99)),
        Err(CheckoutError::UnknownAddress(id)) if id == AddressId::new(99)
    ));
    assert!(checkout.selected_address().is_none());
}

#[tokio::test]
async fn test_guest_cannot_start_checkout() {
    let server = TestServer::start(FakeStore::seeded()).await;
    let state = server.state();

    let result = state.checkout().await;

    assert!(matches!(
        result,
        Err(moto_parts_storefront::Error::Account(AccountError::NotSignedIn))
    ));
    assert_eq!(server.store().count("GET", "/addresses/1"), 0);
}

#[tokio::test]
async fn test_placed_order_shows_in_history() {
    let server = TestServer::start(FakeStore::seeded()).await;
    let state = signed_in_customer(&server).await;
    fill_cart(&state).await;

    let mut checkout = state.checkout().await.unwrap();
    checkout.select_address(AddressId::new(5)).unwrap();
    checkout.select_payment(PaymentMethod::Card);
    let mut cart = state.cart();
    let ConfirmOutcome::Placed(receipt) = checkout.confirm_on(&mut cart, march(10)).await.unwrap()
    else {
        panic!("expected a placed order");
    };

    let orders = state.account().orders().await.unwrap();
    assert!(orders.iter().any(|o| o.id == receipt.order_id));

    let lines = state.account().order_lines(receipt.order_id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].product_name.as_deref(), Some("Brake pads"));
    assert_eq!(lines[0].subtotal, Money::from_cents(2500));
    assert_ne!(receipt.order_id, OrderId::new(0));
}
