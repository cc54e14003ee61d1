//! Order management.
//!
//! Listing, status changes, filtering and the PDF export.

mod export;

pub use export::{ExportDocument, ExportLine, LineStyle, OrderExport, render_export};

use chrono::{NaiveDate, Utc};
use tracing::instrument;

use moto_parts_core::{OrderId, OrderStatus};
use moto_parts_storefront::api::{Order, OrderLine};

use crate::client::AdminClient;
use crate::error::AdminError;

/// Which orders to show or export.
///
/// Date bounds are inclusive and compare the calendar day the order was
/// placed. Orders without an order date never match a date bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl OrderFilter {
    /// Whether `order` passes every set criterion.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }

        let Some(day) = order.order_date.map(|d| d.date_naive()) else {
            return false;
        };
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }

    /// The orders that pass, in their original order.
    #[must_use]
    pub fn apply(&self, orders: &[Order]) -> Vec<Order> {
        orders.iter().filter(|o| self.matches(o)).cloned().collect()
    }

    /// File name for an export of this selection.
    ///
    /// `orders_<from>_<to>.pdf` when both date bounds are set, otherwise
    /// `orders.pdf`.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!(
                "orders_{}_{}.pdf",
                from.format("%Y-%m-%d"),
                to.format("%Y-%m-%d")
            ),
            _ => "orders.pdf".to_string(),
        }
    }
}

impl AdminClient {
    /// Every order in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn orders(&self) -> Result<Vec<Order>, AdminError> {
        Ok(self.api.orders().await?)
    }

    /// Orders passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn filtered_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, AdminError> {
        Ok(filter.apply(&self.api.orders().await?))
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn order_lines(&self, id: OrderId) -> Result<Vec<OrderLine>, AdminError> {
        Ok(self.api.order_lines(id).await?)
    }

    /// Move `order` to `status`, sending the full order back to the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status, to = %status))]
    pub async fn update_order_status(
        &self,
        order: &Order,
        status: OrderStatus,
    ) -> Result<Order, AdminError> {
        let updated = Order {
            status,
            ..order.clone()
        };
        self.api.update_order(&updated).await?;
        tracing::info!("Order status updated");
        Ok(updated)
    }

    /// Render the orders passing `filter` as a PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the PDF cannot be
    /// assembled.
    #[instrument(skip(self))]
    pub async fn export_orders(&self, filter: &OrderFilter) -> Result<OrderExport, AdminError> {
        let orders = self.filtered_orders(filter).await?;
        let users = self.api.users().await?;
        let export = render_export(&orders, &users, filter, Utc::now())?;

        tracing::info!(
            orders = orders.len(),
            file_name = %export.file_name,
            "Order export rendered"
        );
        Ok(export)
    }
}
