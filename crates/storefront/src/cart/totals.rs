//! Cart arithmetic.
//!
//! Amounts are exact decimals; rounding to cents happens only when an
//! amount is displayed.

use moto_parts_core::Money;

use super::CartLine;

/// Unit price times quantity.
#[must_use]
pub fn line_subtotal(line: &CartLine) -> Money {
    line.unit_price * line.quantity
}

/// Sum of every line subtotal; zero for an empty cart.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Money {
    lines.iter().map(line_subtotal).sum()
}

/// Number of units across all lines.
#[must_use]
pub fn item_count(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |count, line| count.saturating_add(line.quantity))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use moto_parts_core::ProductId;

    use super::*;

    fn line(id: i64, price: Money, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Part {id}"),
            unit_price: price,
            quantity,
        }
    }

    #[test]
    fn test_total_of_two_lines() {
        let lines = vec![
            line(1, Money::from_cents(1000), 2),
            line(2, Money::from_cents(550), 1),
        ];
        assert_eq!(cart_total(&lines), Money::from_cents(2550));
        assert_eq!(item_count(&lines), 3);
    }

    #[test]
    fn test_total_ignores_line_order() {
        let mut lines = vec![
            line(1, Money::from_cents(1999), 3),
            line(2, Money::from_cents(550), 1),
            line(3, Money::from_cents(7), 11),
        ];
        let forward = cart_total(&lines);
        lines.reverse();
        assert_eq!(cart_total(&lines), forward);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]), Money::ZERO);
        assert_eq!(item_count(&[]), 0);
    }

    #[test]
    fn test_subtotal_is_not_rounded() {
        let price = Money::new(Decimal::new(3333, 3));
        let subtotal = line_subtotal(&line(1, price, 3));
        assert_eq!(subtotal.amount(), Decimal::new(9999, 3));
        assert_eq!(subtotal.to_string(), "10.00€");
    }
}
