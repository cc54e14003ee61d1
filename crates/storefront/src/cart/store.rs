//! Cart state and its persistence.

use std::collections::HashMap;

use moto_parts_core::ProductId;

use super::CartLine;
use crate::api::Product;
use crate::session::{SessionStore, StorageError};

/// Where the cart document is kept between operations.
pub trait CartPersistence {
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    fn write(&self, document: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Keeps the cart under the session's `cart` key.
#[derive(Clone)]
pub struct SessionCart(pub SessionStore);

impl CartPersistence for SessionCart {
    fn read(&self) -> Result<Option<String>, StorageError> {
        self.0.cart_document()
    }

    fn write(&self, document: &str) -> Result<(), StorageError> {
        self.0.set_cart_document(document)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.0.remove_cart_document()
    }
}

/// The shopping cart.
///
/// Lines keep insertion order and each product appears at most once with a
/// quantity of at least one. Every mutation is persisted immediately. A
/// persistence failure is logged and the in-memory cart stays authoritative,
/// so mutations never fail.
pub struct CartStore<P> {
    persistence: P,
    lines: Vec<CartLine>,
}

impl<P: CartPersistence> CartStore<P> {
    /// Rebuild the cart from `persistence`.
    ///
    /// A missing or unreadable document yields an empty cart.
    pub fn load(persistence: P) -> Self {
        let lines = match persistence.read() {
            Ok(Some(document)) => parse_document(&document),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart, starting empty");
                Vec::new()
            }
        };

        Self { persistence, lines }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `product` in the cart, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, product: ProductId) -> u32 {
        self.position(product)
            .and_then(|i| self.lines.get(i))
            .map_or(0, |line| line.quantity)
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// Adding zero units does nothing, and so does an addition whose line
    /// subtotal would not fit in a [`Money`].
    ///
    /// [`Money`]: moto_parts_core::Money
    pub fn add_or_increment(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        let total = self.quantity_of(product.id).saturating_add(quantity);
        if product.price.checked_mul(total).is_none() {
            tracing::warn!(
                product_id = %product.id,
                quantity = total,
                "Cart line subtotal out of range, not added"
            );
            return;
        }

        match self.line_mut(product.id) {
            Some(line) => line.quantity = total,
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            }),
        }

        tracing::debug!(product_id = %product.id, quantity, "Added to cart");
        self.persist();
    }

    /// One more unit of `product`. Unknown products are ignored.
    pub fn increment(&mut self, product: ProductId) {
        if let Some(line) = self.line_mut(product) {
            let quantity = line.quantity.saturating_add(1);
            if line.unit_price.checked_mul(quantity).is_none() {
                return;
            }
            line.quantity = quantity;
            self.persist();
        }
    }

    /// One unit less of `product`; the line goes away at zero. Unknown
    /// products are ignored.
    pub fn decrement(&mut self, product: ProductId) {
        let Some(index) = self.position(product) else {
            return;
        };

        let remove = match self.lines.get_mut(index) {
            Some(line) if line.quantity > 1 => {
                line.quantity -= 1;
                false
            }
            Some(_) => true,
            None => return,
        };
        if remove {
            self.lines.remove(index);
        }
        self.persist();
    }

    /// Drop the line for `product`, if any.
    pub fn remove(&mut self, product: ProductId) {
        if let Some(index) = self.position(product) {
            self.lines.remove(index);
            self.persist();
        }
    }

    /// Empty the cart and delete the persisted document.
    pub fn clear(&mut self) {
        self.lines.clear();
        if let Err(e) = self.persistence.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted cart");
        }
    }

    fn position(&self, product: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product)
    }

    fn line_mut(&mut self, product: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product)
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.lines)
            .map_err(StorageError::from)
            .and_then(|document| self.persistence.write(&document));

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Parse a stored cart, dropping empty, negative or out-of-range lines and
/// merging duplicate products.
fn parse_document(document: &str) -> Vec<CartLine> {
    let stored: Vec<CartLine> = match serde_json::from_str(document) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable persisted cart");
            return Vec::new();
        }
    };

    let mut lines: Vec<CartLine> = Vec::with_capacity(stored.len());
    let mut seen: HashMap<ProductId, usize> = HashMap::new();

    for line in stored {
        if line.quantity == 0
            || line.unit_price.is_negative()
            || line.unit_price.checked_mul(line.quantity).is_none()
        {
            continue;
        }
        if let Some(existing) = seen.get(&line.product_id).and_then(|&i| lines.get_mut(i)) {
            let quantity = existing.quantity.saturating_add(line.quantity);
            if existing.unit_price.checked_mul(quantity).is_some() {
                existing.quantity = quantity;
            }
        } else {
            seen.insert(line.product_id, lines.len());
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use moto_parts_core::Money;

    use super::*;
    use crate::cart::totals::cart_total;

    #[derive(Default)]
    struct Recorder {
        document: RefCell<Option<String>>,
        fail: bool,
    }

    impl CartPersistence for &Recorder {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Ok(self.document.borrow().clone())
        }

        fn write(&self, document: &str) -> Result<(), StorageError> {
            if self.fail {
                return Err(std::io::Error::other("disk full").into());
            }
            *self.document.borrow_mut() = Some(document.to_string());
            Ok(())
        }

        fn clear(&self) -> Result<(), StorageError> {
            *self.document.borrow_mut() = None;
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

    #[test]
    fn test_add_twice_merges_into_one_line() {
        let recorder = Recorder::default();
        let mut cart = CartStore::load(&recorder);

        cart.add_or_increment(&product(1, 1000), 1);
        cart.add_or_increment(&product(1, 1000), 1);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let recorder = Recorder::default();
        let mut cart = CartStore::load(&recorder);

        cart.add_or_increment(&product(1, 1000), 0);

        assert!(cart.is_empty());
        assert!(recorder.document.borrow().is_none());
    }

    #[test]
    fn test_decrement_at_one_removes_line() {
        let recorder = Recorder::default();
        let mut cart = CartStore::load(&recorder);
        cart.add_or_increment(&product(1, 1000), 1);
        cart.add_or_increment(&product(2, 550), 2);

        cart.decrement(ProductId::new(1));
        cart.decrement(ProductId::new(2));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(2)), 1);
    }

    #[test]
    fn test_unknown_product_is_ignored() {
        let recorder = Recorder::default();
        let mut cart = CartStore::load(&recorder);
        cart.add_or_increment(&product(1, 1000), 1);

        cart.decrement(ProductId::new(9));
        cart.increment(ProductId::new(9));
        cart.remove(ProductId::new(9));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_keeps_insertion_order() {
        let recorder = Recorder::default();
        let mut cart = CartStore::load(&recorder);
        for id in [3, 1, 2] {
            cart.add_or_increment(&product(id, 100), 1);
        }
        cart.increment(ProductId::new(3));

        let order: Vec<i64> = cart.lines().iter().map(|l| l.product_id.as_i64()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_mutations_are_persisted_and_reloaded() {
        let recorder = Recorder::default();
        {
            let mut cart = CartStore::load(&recorder);
            cart.add_or_increment(&product(1, 1000), 2);
            cart.add_or_increment(&product(2, 550), 1);
        }

        let reloaded = CartStore::load(&recorder);
        assert_eq!(reloaded.lines().len(), 2);
        assert_eq!(cart_total(reloaded.lines()), Money::from_cents(2550));
    }

    #[test]
    fn test_clear_removes_document() {
        let recorder = Recorder::default();
        let mut cart = CartStore::load(&recorder);
        cart.add_or_increment(&product(1, 1000), 1);

        cart.clear();

        assert!(cart.is_empty());
        assert!(recorder.document.borrow().is_none());
    }

    #[test]
    fn test_corrupt_or_absent_document_loads_empty() {
        let recorder = Recorder::default();
        assert!(CartStore::load(&recorder).is_empty());

        *recorder.document.borrow_mut() = Some("[{\"productId\": ".to_string());
        assert!(CartStore::load(&recorder).is_empty());

        *recorder.document.borrow_mut() = Some("{\"not\": \"a list\"}".to_string());
        assert!(CartStore::load(&recorder).is_empty());
    }

    #[test]
    fn test_load_normalizes_lines() {
        let recorder = Recorder::default();
        *recorder.document.borrow_mut() = Some(
            r#"[
                {"productId": 1, "name": "Chain", "unitPrice": 10.0, "quantity": 1},
                {"productId": 2, "name": "Pads", "unitPrice": 5.5, "quantity": 0},
                {"productId": 1, "name": "Chain", "unitPrice": 10.0, "quantity": 2}
            ]"#
            .to_string(),
        );

        let cart = CartStore::load(&recorder);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 3);
    }

    #[test]
    fn test_huge_prices_total_without_panicking() {
        let recorder = Recorder::default();
        *recorder.document.borrow_mut() = Some(
            r#"[
                {"productId": 1, "name": "Gold chain", "unitPrice": 50000000000000000000000000000.0, "quantity": 1},
                {"productId": 2, "name": "Gold pads", "unitPrice": 50000000000000000000000000000.0, "quantity": 1},
                {"productId": 3, "name": "Gold bolts", "unitPrice": 50000000000000000000000000000.0, "quantity": 2}
            ]"#
            .to_string(),
        );

        let cart = CartStore::load(&recorder);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart_total(cart.lines()), Money::new(rust_decimal::Decimal::MAX));
    }

    #[test]
    fn test_out_of_range_quantity_is_not_added() {
        let recorder = Recorder::default();
        let mut cart = CartStore::load(&recorder);
        let mut gold = product(1, 0);
        gold.price = Money::new(rust_decimal::Decimal::MAX);

        cart.add_or_increment(&gold, 1);
        cart.add_or_increment(&gold, 1);
        cart.increment(ProductId::new(1));

        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut cart = CartStore::load(&recorder);

        cart.add_or_increment(&product(1, 1000), 1);

        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_session_cart_round_trip() {
        let session = SessionStore::in_memory();
        let mut cart = CartStore::load(SessionCart(session.clone()));
        cart.add_or_increment(&product(4, 1999), 1);

        assert!(session.cart_document().unwrap().is_some());
        assert_eq!(CartStore::load(SessionCart(session)).lines().len(), 1);
    }
}
