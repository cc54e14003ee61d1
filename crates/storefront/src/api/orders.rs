//! Order and order-line endpoints.

use reqwest::Method;
use tracing::instrument;

use moto_parts_core::{OrderId, UserId};

use super::types::{Order, OrderCreated, OrderDraft, OrderLine, OrderLineDraft};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Submit an order header.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the reply has no
    /// `orderId`.
    #[instrument(skip(self, draft), fields(user_id = %draft.user_id, total = %draft.total_amount))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, ApiError> {
        self.send(Method::POST, "orders", draft).await
    }

    /// Attach one line to an existing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the line.
    #[instrument(skip(self), fields(order_id = %line.order_id, product_id = %line.product_id))]
    pub async fn create_order_line(&self, line: &OrderLineDraft) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "order-lines", line).await
    }

    /// Every order in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("orders").await
    }

    /// Orders placed by `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn user_orders(&self, user: UserId) -> Result<Vec<Order>, ApiError> {
        self.get(&format!("orders/user/{user}")).await
    }

    /// Lines of one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order_lines(&self, id: OrderId) -> Result<Vec<OrderLine>, ApiError> {
        self.get(&format!("orders/{id}/lines")).await
    }

    /// Replace an order. Used to change its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, order), fields(order_id = %order.id, status = %order.status))]
    pub async fn update_order(&self, order: &Order) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, &format!("orders/{}", order.id), order)
            .await
    }
}
