//! Checkout orchestration.
//!
//! Turns the cart into an order in two steps: one order header, then one
//! order line per cart line. Lines are sent one at a time in cart order, and
//! only after the header has been accepted.
//!
//! # States
//!
//! ```text
//! Idle -> Selecting -> Submitting -> Succeeded
//!             ^             |
//!             +-- Failed <--+
//! ```
//!
//! A failed header leaves the cart untouched; the next selection or confirm
//! retries with a brand new header. A failed line does not stop the lines
//! after it and is reported in the [`OrderReceipt`].

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use thiserror::Error;
use tracing::instrument;

use moto_parts_core::{AddressId, Money, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

use crate::api::{Address, ApiClient, ApiError, OrderCreated, OrderDraft, OrderLineDraft};
use crate::cart::{CartPersistence, CartStore, totals};
use crate::guard::View;

/// Days between placing an order and its promised delivery.
pub const DELIVERY_DAYS: u64 = 7;

/// The API calls checkout depends on.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn user_addresses(&self, user: UserId) -> Result<Vec<Address>, ApiError>;

    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, ApiError>;

    async fn create_order_line(&self, line: &OrderLineDraft) -> Result<(), ApiError>;
}

#[async_trait]
impl OrderGateway for ApiClient {
    async fn user_addresses(&self, user: UserId) -> Result<Vec<Address>, ApiError> {
        self.addresses(user).await
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, ApiError> {
        Self::create_order(self, draft).await
    }

    async fn create_order_line(&self, line: &OrderLineDraft) -> Result<(), ApiError> {
        Self::create_order_line(self, line).await
    }
}

/// Errors that stop a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user's addresses could not be loaded.
    #[error("could not load shipping addresses: {0}")]
    AddressesUnavailable(#[source] ApiError),

    /// The selected address is not one of the user's.
    #[error("address {0} does not belong to this user")]
    UnknownAddress(AddressId),

    /// The API refused the order header. Nothing was submitted.
    #[error("order was not accepted: {0}")]
    OrderRejected(#[source] ApiError),

    /// Today plus the delivery lead time is not a representable date.
    #[error("delivery date is out of range")]
    DeliveryDateOutOfRange,
}

/// Where the checkout is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Selecting,
    Submitting,
    Succeeded,
    Failed,
}

/// A cart line the API did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub error: String,
}

/// What a completed checkout produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub total: Money,
    pub delivery_date: NaiveDate,
    /// Products whose lines were accepted, in submission order.
    pub submitted: Vec<ProductId>,
    pub failed_lines: Vec<FailedLine>,
    /// View to show next.
    pub redirect: View,
}

impl OrderReceipt {
    /// True when the order exists but some of its lines are missing.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed_lines.is_empty()
    }
}

/// Result of [`Checkout::confirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Address, payment method or cart contents are missing. Nothing was sent.
    NotReady,
    /// The checkout is already submitting or finished. Nothing was sent.
    Ignored,
    /// The order was placed and the cart cleared.
    Placed(OrderReceipt),
}

/// One checkout attempt for one user.
pub struct Checkout<G> {
    gateway: G,
    user: UserId,
    addresses: Vec<Address>,
    address: Option<AddressId>,
    payment: Option<PaymentMethod>,
    state: CheckoutState,
}

impl<G: OrderGateway> Checkout<G> {
    /// A checkout that has not loaded anything yet.
    pub const fn new(gateway: G, user: UserId) -> Self {
        Self {
            gateway,
            user,
            addresses: Vec::new(),
            address: None,
            payment: None,
            state: CheckoutState::Idle,
        }
    }

    /// Start a checkout by loading the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::AddressesUnavailable` if the addresses cannot
    /// be fetched.
    #[instrument(skip(gateway), fields(user_id = %user))]
    pub async fn begin(gateway: G, user: UserId) -> Result<Self, CheckoutError> {
        let mut checkout = Self::new(gateway, user);
        checkout.addresses = checkout
            .gateway
            .user_addresses(user)
            .await
            .map_err(CheckoutError::AddressesUnavailable)?;
        checkout.state = CheckoutState::Selecting;

        tracing::debug!(
            addresses = checkout.addresses.len(),
            "Checkout started"
        );
        Ok(checkout)
    }

    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// The user's addresses, as loaded by [`Checkout::begin`].
    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        let id = self.address?;
        self.addresses.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub const fn selected_payment(&self) -> Option<PaymentMethod> {
        self.payment
    }

    /// Choose the shipping address.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::UnknownAddress` if `id` is not one of the
    /// loaded addresses; the previous selection is kept.
    pub fn select_address(&mut self, id: AddressId) -> Result<(), CheckoutError> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(CheckoutError::UnknownAddress(id));
        }
        self.address = Some(id);
        self.reopen();
        Ok(())
    }

    /// Choose the payment method.
    pub fn select_payment(&mut self, method: PaymentMethod) {
        self.payment = Some(method);
        self.reopen();
    }

    /// Whether [`Checkout::confirm`] would submit anything.
    #[must_use]
    pub fn can_confirm<P: CartPersistence>(&self, cart: &CartStore<P>) -> bool {
        matches!(
            self.state,
            CheckoutState::Selecting | CheckoutState::Failed
        ) && self.selected_address().is_some()
            && self.payment.is_some()
            && !cart.is_empty()
    }

    /// Place the order with today's date.
    ///
    /// # Errors
    ///
    /// See [`Checkout::confirm_on`].
    pub async fn confirm<P: CartPersistence>(
        &mut self,
        cart: &mut CartStore<P>,
    ) -> Result<ConfirmOutcome, CheckoutError> {
        self.confirm_on(cart, Local::now().date_naive()).await
    }

    /// Place the order as if today were `today`.
    ///
    /// Submits the header, then every cart line in order, then clears the
    /// cart. Lines the API rejects are listed in the receipt.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::OrderRejected` if the header is refused; the
    /// cart is kept and no line is sent.
    #[instrument(skip(self, cart), fields(user_id = %self.user))]
    pub async fn confirm_on<P: CartPersistence>(
        &mut self,
        cart: &mut CartStore<P>,
        today: NaiveDate,
    ) -> Result<ConfirmOutcome, CheckoutError> {
        if matches!(
            self.state,
            CheckoutState::Submitting | CheckoutState::Succeeded
        ) {
            tracing::debug!(state = ?self.state, "Ignoring confirm");
            return Ok(ConfirmOutcome::Ignored);
        }

        let (Some(address), Some(payment)) = (self.selected_address(), self.payment) else {
            return Ok(ConfirmOutcome::NotReady);
        };
        if cart.is_empty() {
            return Ok(ConfirmOutcome::NotReady);
        }

        let delivery_date = today
            .checked_add_days(Days::new(DELIVERY_DAYS))
            .ok_or(CheckoutError::DeliveryDateOutOfRange)?;

        let draft = OrderDraft {
            user_id: self.user,
            status: OrderStatus::Pending,
            total_amount: totals::cart_total(cart.lines()),
            shipping_address: address.one_line(),
            payment_method: payment,
            delivery_date,
        };

        self.state = CheckoutState::Submitting;

        let created = match self.gateway.create_order(&draft).await {
            Ok(created) => created,
            Err(e) => {
                self.state = CheckoutState::Failed;
                tracing::error!(error = %e, "Order header rejected");
                return Err(CheckoutError::OrderRejected(e));
            }
        };
        let order_id = created.order_id;

        let mut submitted = Vec::with_capacity(cart.lines().len());
        let mut failed_lines = Vec::new();

        for line in cart.lines() {
            let draft = OrderLineDraft {
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
            };
            match self.gateway.create_order_line(&draft).await {
                Ok(()) => submitted.push(line.product_id),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        order_id = %order_id,
                        product_id = %line.product_id,
                        "Order line rejected"
                    );
                    failed_lines.push(FailedLine {
                        product_id: line.product_id,
                        quantity: line.quantity,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !failed_lines.is_empty() {
            tracing::warn!(
                order_id = %order_id,
                failed = failed_lines.len(),
                submitted = submitted.len(),
                "Order placed with missing lines"
            );
        }

        cart.clear();
        self.state = CheckoutState::Succeeded;
        tracing::info!(order_id = %order_id, total = %draft.total_amount, "Order placed");

        Ok(ConfirmOutcome::Placed(OrderReceipt {
            order_id,
            total: draft.total_amount,
            delivery_date,
            submitted,
            failed_lines,
            redirect: View::Home,
        }))
    }

    fn reopen(&mut self) {
        if matches!(self.state, CheckoutState::Idle | CheckoutState::Failed) {
            self.state = CheckoutState::Selecting;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use moto_parts_core::Money;

    use super::*;
    use crate::api::Product;
    use crate::cart::SessionCart;
    use crate::session::SessionStore;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Header(OrderDraft),
        Line(OrderLineDraft),
    }

    #[derive(Default)]
    struct FakeGateway {
        addresses: Vec<Address>,
        reject_header: bool,
        reject_product: Option<ProductId>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeGateway {
        fn with_address() -> Self {
            Self {
                addresses: vec![Address {
                    id: AddressId::new(5),
                    street: "Calle Mayor 1".to_string(),
                    city: "Madrid".to_string(),
                    country: "Spain".to_string(),
                    postal_code: "28013".to_string(),
                }],
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderGateway for &FakeGateway {
        async fn user_addresses(&self, _user: UserId) -> Result<Vec<Address>, ApiError> {
            Ok(self.addresses.clone())
        }

        async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, ApiError> {
            self.calls.lock().unwrap().push(Call::Header(draft.clone()));
            if self.reject_header {
                return Err(ApiError::Status {
                    status: 500,
                    message: "header".to_string(),
                });
            }
            Ok(OrderCreated {
                order_id: OrderId::new(81),
            })
        }

        async fn create_order_line(&self, line: &OrderLineDraft) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(Call::Line(*line));
            if Some(line.product_id) == self.reject_product {
                return Err(ApiError::Status {
                    status: 409,
                    message: "out of stock".to_string(),
                });
            }
            Ok(())
        }
    }

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Part {id}"),
            description: String::new(),
            price: Money::from_cents(cents),
            stock: 10,
            model_id: None,
        }
    }

    fn cart_with(products: &[(i64, i64, u32)]) -> CartStore<SessionCart> {
        let mut cart = CartStore::load(SessionCart(SessionStore::in_memory()));
        for &(id, cents, qty) in products {
            cart.add_or_increment(&product(id, cents), qty);
        }
        cart
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    async fn ready(gateway: &FakeGateway) -> Checkout<&FakeGateway> {
        let mut checkout = Checkout::begin(gateway, UserId::new(3)).await.unwrap();
        checkout.select_address(AddressId::new(5)).unwrap();
        checkout.select_payment(PaymentMethod::Card);
        checkout
    }

    #[tokio::test]
    async fn test_confirm_without_selection_sends_nothing() {
        let gateway = FakeGateway::with_address();
        let mut cart = cart_with(&[(1, 1000, 2)]);

        let mut checkout = Checkout::begin(&gateway, UserId::new(3)).await.unwrap();
        assert!(!checkout.can_confirm(&cart));
        let outcome = checkout.confirm_on(&mut cart, today()).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::NotReady);

        checkout.select_payment(PaymentMethod::Paypal);
        let outcome = checkout.confirm_on(&mut cart, today()).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::NotReady);

        assert!(gateway.calls().is_empty());
        assert!(!cart.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_is_not_ready() {
        let gateway = FakeGateway::with_address();
        let mut cart = cart_with(&[]);
        let mut checkout = ready(&gateway).await;

        let outcome = checkout.confirm_on(&mut cart, today()).await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::NotReady);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_address_is_rejected() {
        let gateway = FakeGateway::with_address();
        let mut checkout = Checkout::begin(&gateway, UserId::new(3)).await.unwrap();

        let err = checkout.select_address(AddressId::new(99)).unwrap_err();

        assert!(matches!(err, CheckoutError::UnknownAddress(id) if id == AddressId::new(99)));
        assert!(checkout.selected_address().is_none());
    }

    #[tokio::test]
    async fn test_places_header_then_lines_in_cart_order() {
        let gateway = FakeGateway::with_address();
        let mut cart = cart_with(&[(1, 1000, 2), (2, 550, 1)]);
        let mut checkout = ready(&gateway).await;
        assert!(checkout.can_confirm(&cart));

        let ConfirmOutcome::Placed(receipt) =
            checkout.confirm_on(&mut cart, today()).await.unwrap()
        else {
            panic!("expected an order");
        };

        assert_eq!(receipt.order_id, OrderId::new(81));
        assert_eq!(receipt.total, Money::from_cents(2550));
        assert_eq!(receipt.delivery_date, NaiveDate::from_ymd_opt(2026, 10, 26).unwrap());
        assert_eq!(receipt.redirect, View::Home);
        assert!(!receipt.is_partial());
        assert!(cart.is_empty());
        assert_eq!(checkout.state(), CheckoutState::Succeeded);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 3);
        let Call::Header(header) = &calls[0] else {
            panic!("header must be sent first");
        };
        assert_eq!(header.status, OrderStatus::Pending);
        assert_eq!(header.payment_method, PaymentMethod::Card);
        assert_eq!(header.shipping_address, "Calle Mayor 1, Madrid, Spain, 28013");
        assert_eq!(
            calls[1..].to_vec(),
            vec![
                Call::Line(OrderLineDraft {
                    order_id: OrderId::new(81),
                    product_id: ProductId::new(1),
                    quantity: 2,
                }),
                Call::Line(OrderLineDraft {
                    order_id: OrderId::new(81),
                    product_id: ProductId::new(2),
                    quantity: 1,
                }),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_line_does_not_stop_later_lines() {
        let gateway = FakeGateway {
            reject_product: Some(ProductId::new(2)),
            ..FakeGateway::with_address()
        };
        let mut cart = cart_with(&[(1, 1000, 1), (2, 550, 1), (3, 200, 4)]);
        let mut checkout = ready(&gateway).await;

        let ConfirmOutcome::Placed(receipt) =
            checkout.confirm_on(&mut cart, today()).await.unwrap()
        else {
            panic!("expected an order");
        };

        assert!(receipt.is_partial());
        assert_eq!(
            receipt.submitted,
            vec![ProductId::new(1), ProductId::new(3)]
        );
        assert_eq!(receipt.failed_lines.len(), 1);
        assert_eq!(receipt.failed_lines[0].product_id, ProductId::new(2));
        assert_eq!(gateway.calls().len(), 4);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_header_failure_keeps_cart_and_allows_retry() {
        let gateway = FakeGateway {
            reject_header: true,
            ..FakeGateway::with_address()
        };
        let mut cart = cart_with(&[(1, 1000, 1), (2, 550, 1)]);
        let mut checkout = ready(&gateway).await;

        let err = checkout.confirm_on(&mut cart, today()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderRejected(_)));
        assert_eq!(checkout.state(), CheckoutState::Failed);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(gateway.calls().len(), 1);

        assert!(checkout.can_confirm(&cart));
        let _ = checkout.confirm_on(&mut cart, today()).await;
        let headers = gateway
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Header(_)))
            .count();
        assert_eq!(headers, 2);
    }

    #[tokio::test]
    async fn test_confirm_after_success_is_ignored() {
        let gateway = FakeGateway::with_address();
        let mut cart = cart_with(&[(1, 1000, 1)]);
        let mut checkout = ready(&gateway).await;
        checkout.confirm_on(&mut cart, today()).await.unwrap();

        cart.add_or_increment(&product(2, 100), 1);
        let outcome = checkout.confirm_on(&mut cart, today()).await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::Ignored);
        assert_eq!(gateway.calls().len(), 2);
    }
}
