//! Wire types exchanged with the store API.
//!
//! Field names are camelCase on the wire. Payloads the client sends are
//! separate types from the records the API returns, so ids the server
//! assigns never have to be faked on the way out.

use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use moto_parts_core::{
    AddressId, BrandId, Gender, ModelId, Money, OrderId, OrderLineId, OrderStatus, PaymentMethod,
    ProductId, Rating, ReviewId, Role, UserId,
};

// =============================================================================
// Catalog
// =============================================================================

/// A motorcycle manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A motorcycle model parts are sold for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
}

/// A part on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub model_id: Option<ModelId>,
}

/// Body of `POST /brands` and `PUT /brands/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPayload {
    pub name: String,
    pub description: String,
}

/// Body of `POST /models` and `PUT /models/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPayload {
    pub name: String,
    pub description: String,
    pub brand_id: Option<BrandId>,
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: u32,
    pub model_id: ModelId,
}

// =============================================================================
// Accounts
// =============================================================================

/// A store account as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    #[serde(serialize_with = "expose")]
    pub password: &'a SecretString,
}

/// Reply to a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: UserId,
    pub role: Role,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    #[serde(serialize_with = "expose")]
    pub password: &'a SecretString,
}

/// Body of `POST /auth/reset-password`.
#[derive(Debug, Serialize)]
pub struct PasswordResetRequest<'a> {
    pub email: &'a str,
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn expose<S: Serializer>(secret: &&SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

// =============================================================================
// Addresses
// =============================================================================

/// A shipping address stored for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

impl Address {
    /// The address on one line: street, city, country and postal code
    /// separated by ", ". This is the text stored on an order.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.street, self.city, self.country, self.postal_code
        )
    }
}

/// Body of `POST /addresses` and `PUT /addresses/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Order header sent at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub delivery_date: NaiveDate,
}

/// Reply to `POST /orders`. Echoed draft fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: OrderId,
}

/// One product line attached to an already-created order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDraft {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub delivery_date: NaiveDate,
}

/// A stored order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderLineId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

// =============================================================================
// Reviews
// =============================================================================

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: Rating,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Display name of the author, when the API includes it.
    #[serde(default)]
    pub author: Option<String>,
}

/// Body of `POST /reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: Rating,
    pub comment: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_draft_wire_shape() {
        let draft = OrderDraft {
            user_id: UserId::new(3),
            status: OrderStatus::Pending,
            total_amount: Money::from_cents(2550),
            shipping_address: "Calle Mayor 1, Madrid, Spain, 28013".to_string(),
            payment_method: PaymentMethod::Card,
            delivery_date: NaiveDate::from_ymd_opt(2026, 10, 26).unwrap(),
        };

        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({
                "userId": 3,
                "status": "pending",
                "totalAmount": 25.5,
                "shippingAddress": "Calle Mayor 1, Madrid, Spain, 28013",
                "paymentMethod": "card",
                "deliveryDate": "2026-10-26",
            })
        );
    }

    #[test]
    fn test_order_created_ignores_echoed_fields() {
        let created: OrderCreated = serde_json::from_value(json!({
            "orderId": 81,
            "status": "pending",
            "totalAmount": 25.5,
        }))
        .unwrap();
        assert_eq!(created.order_id, OrderId::new(81));
    }

    #[test]
    fn test_login_request_exposes_password_only_on_the_wire() {
        let password = SecretString::from("hunter22");
        let request = LoginRequest {
            email: "rider@example.com",
            password: &password,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["password"], "hunter22");
        assert!(!format!("{request:?}").contains("hunter22"));
    }

    #[test]
    fn test_address_one_line() {
        let address = Address {
            id: AddressId::new(1),
            street: "Gran Via 4".to_string(),
            city: "Bilbao".to_string(),
            country: "Spain".to_string(),
            postal_code: "48001".to_string(),
        };
        assert_eq!(address.one_line(), "Gran Via 4, Bilbao, Spain, 48001");
    }

    #[test]
    fn test_product_defaults_optional_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": 9,
            "name": "Chain kit",
            "price": 89.9,
        }))
        .unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.model_id, None);
        assert_eq!(product.price, Money::from_cents(8990));
    }
}
