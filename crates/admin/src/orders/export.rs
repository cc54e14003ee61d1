//! Printable order-list export as PDF.
//!
//! The export is laid out as plain text lines first ([`ExportDocument`]),
//! then drawn onto A4 pages with the PDF built-in Helvetica faces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use moto_parts_core::UserId;
use moto_parts_storefront::api::{Order, User};

use super::OrderFilter;
use crate::error::AdminError;

// =============================================================================
// Page geometry (millimetres)
// =============================================================================

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;

/// Text lines that fit between the top and bottom margins.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT) as usize;

// =============================================================================
// Layout
// =============================================================================

/// How a line is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
    Blank,
}

impl LineStyle {
    const fn font_size(self) -> f32 {
        match self {
            Self::Title => 18.0,
            Self::Heading => 12.0,
            Self::Body | Self::Blank => 10.0,
        }
    }
}

/// One line of text in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLine {
    pub style: LineStyle,
    pub text: String,
}

impl ExportLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    fn field(label: &str, value: impl AsRef<str>) -> Self {
        Self::new(LineStyle::Body, format!("{label}: {}", value.as_ref()))
    }

    fn blank() -> Self {
        Self::new(LineStyle::Blank, "")
    }
}

/// The export laid out as blocks of lines.
///
/// The first block is the document header; each following block is one
/// order. Blocks are never split across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub blocks: Vec<Vec<ExportLine>>,
}

impl ExportDocument {
    /// Lay out `orders` with their customers' names and emails.
    #[must_use]
    pub fn new(
        orders: &[Order],
        users: &[User],
        filter: &OrderFilter,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let users: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();

        let mut header = vec![
            ExportLine::new(LineStyle::Title, "Orders"),
            ExportLine::new(
                LineStyle::Body,
                format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
            ),
        ];
        if let Some(range) = date_range(filter) {
            header.push(ExportLine::field("Period", range));
        }
        if let Some(status) = filter.status {
            header.push(ExportLine::field("Status", status.to_string()));
        }
        header.push(ExportLine::field("Orders", orders.len().to_string()));
        header.push(ExportLine::blank());

        let mut blocks = vec![header];
        if orders.is_empty() {
            blocks.push(vec![ExportLine::new(
                LineStyle::Body,
                "No orders match this selection.",
            )]);
        }
        blocks.extend(
            orders
                .iter()
                .map(|o| order_block(o, users.get(&o.user_id).copied())),
        );

        Self { blocks }
    }

    /// Group the blocks into pages that fit between the page margins.
    ///
    /// A block longer than a page gets a page to itself and is cut there.
    #[must_use]
    pub fn pages(&self) -> Vec<Vec<&ExportLine>> {
        let mut pages: Vec<Vec<&ExportLine>> = vec![Vec::new()];

        for block in &self.blocks {
            let fits = pages
                .last()
                .is_some_and(|page| page.len() + block.len() <= LINES_PER_PAGE);
            if !fits && pages.last().is_some_and(|page| !page.is_empty()) {
                pages.push(Vec::new());
            }
            if let Some(page) = pages.last_mut() {
                page.extend(block.iter().take(LINES_PER_PAGE));
            }
        }

        pages
    }

    /// Draw the document as PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF cannot be assembled.
    pub fn to_pdf(&self) -> Result<Vec<u8>, printpdf::Error> {
        let (doc, first_page, first_layer) =
            PdfDocument::new("Orders", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Orders");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

        for (index, lines) in self.pages().into_iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Orders");
                doc.get_page(page).get_layer(layer)
            };
            draw_page(&layer, &lines, &regular, &bold);
        }

        doc.save_to_bytes()
    }
}

fn draw_page(
    layer: &PdfLayerReference,
    lines: &[&ExportLine],
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        if line.style != LineStyle::Blank {
            let font = match line.style {
                LineStyle::Title | LineStyle::Heading => bold,
                LineStyle::Body | LineStyle::Blank => regular,
            };
            layer.use_text(
                line.text.as_str(),
                line.style.font_size(),
                Mm(MARGIN),
                Mm(y),
                font,
            );
        }
        y -= LINE_HEIGHT;
    }
}

fn date_range(filter: &OrderFilter) -> Option<String> {
    let day = |d: Option<chrono::NaiveDate>| {
        d.map_or_else(|| "any".to_string(), |d| d.format("%Y-%m-%d").to_string())
    };
    match (filter.from, filter.to) {
        (None, None) => None,
        (from, to) => Some(format!("{} to {}", day(from), day(to))),
    }
}

fn order_block(order: &Order, customer: Option<&User>) -> Vec<ExportLine> {
    let customer = customer.map_or_else(
        || "Unknown customer".to_string(),
        |u| format!("{} ({})", u.full_name(), u.email),
    );
    let placed = order
        .order_date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    vec![
        ExportLine::new(LineStyle::Heading, format!("Order #{}", order.id)),
        ExportLine::field("Customer", customer),
        ExportLine::field("Order date", placed),
        ExportLine::field("Status", order.status.to_string()),
        ExportLine::field("Total", format!("{:.2} EUR", order.total_amount.rounded())),
        ExportLine::field("Shipping address", &order.shipping_address),
        ExportLine::field("Payment method", order.payment_method.label()),
        ExportLine::field(
            "Delivery date",
            order.delivery_date.format("%Y-%m-%d").to_string(),
        ),
        ExportLine::blank(),
    ]
}

// =============================================================================
// Export
// =============================================================================

/// A rendered export, ready to save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderExport {
    pub file_name: String,
    pub orders: usize,
    pub pdf: Vec<u8>,
}

impl OrderExport {
    /// Save the document under `dir` and return its path.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Io` if the file cannot be written.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, AdminError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.pdf).await?;
        Ok(path)
    }
}

/// Render `orders` with their customers' names and emails as a PDF.
///
/// # Errors
///
/// Returns an error if the PDF cannot be assembled.
pub fn render_export(
    orders: &[Order],
    users: &[User],
    filter: &OrderFilter,
    generated_at: DateTime<Utc>,
) -> Result<OrderExport, printpdf::Error> {
    let document = ExportDocument::new(orders, users, filter, generated_at);

    Ok(OrderExport {
        file_name: filter.export_file_name(),
        orders: orders.len(),
        pdf: document.to_pdf()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use moto_parts_core::{Money, OrderId, OrderStatus, PaymentMethod, Role};

    use super::*;

    fn user(id: i64, first: &str, email: &str) -> User {
        User {
            id: UserId::new(id),
            first_name: first.to_string(),
            last_name: "Rider".to_string(),
            email: email.to_string(),
            phone: None,
            birth_date: None,
            gender: None,
            role: Role::Customer,
        }
    }

    fn order(id: i64, user: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(user),
            order_date: Some(Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap()),
            status: OrderStatus::Shipped,
            total_amount: Money::from_cents(2550),
            shipping_address: "Gran Via 4, Bilbao, Spain, 48001".to_string(),
            payment_method: PaymentMethod::BankTransfer,
            delivery_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
        }
    }

    fn texts(document: &ExportDocument) -> Vec<String> {
        document
            .blocks
            .iter()
            .flatten()
            .map(|l| l.text.clone())
            .collect()
    }

    #[test]
    fn test_document_lists_orders_with_customers() {
        let users = [user(1, "Marta", "marta@example.com")];
        let orders = [order(10, 1), order(11, 2)];
        let filter = OrderFilter {
            from: NaiveDate::from_ymd_opt(2026, 3, 1),
            to: NaiveDate::from_ymd_opt(2026, 3, 31),
            status: None,
        };

        let document = ExportDocument::new(&orders, &users, &filter, Utc::now());
        let lines = texts(&document);

        assert_eq!(document.blocks.len(), 3);
        assert!(lines.contains(&"Period: 2026-03-01 to 2026-03-31".to_string()));
        assert!(lines.contains(&"Order #10".to_string()));
        assert!(lines.contains(&"Customer: Marta Rider (marta@example.com)".to_string()));
        assert!(lines.contains(&"Customer: Unknown customer".to_string()));
        assert!(lines.contains(&"Total: 25.50 EUR".to_string()));
        assert!(lines.contains(&"Shipping address: Gran Via 4, Bilbao, Spain, 48001".to_string()));
        assert!(lines.contains(&"Delivery date: 2026-03-09".to_string()));
    }

    #[test]
    fn test_empty_selection_says_so() {
        let document = ExportDocument::new(&[], &[], &OrderFilter::default(), Utc::now());

        assert!(texts(&document).contains(&"No orders match this selection.".to_string()));
        assert_eq!(document.pages().len(), 1);
    }

    #[test]
    fn test_orders_are_not_split_across_pages() {
        let orders: Vec<Order> = (1..=12).map(|id| order(id, 1)).collect();
        let document = ExportDocument::new(&orders, &[], &OrderFilter::default(), Utc::now());

        let pages = document.pages();

        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.len() <= LINES_PER_PAGE);
            let first = page.first().unwrap();
            assert!(first.style == LineStyle::Title || first.style == LineStyle::Heading);
        }
        let drawn: usize = pages.iter().map(Vec::len).sum();
        assert_eq!(drawn, document.blocks.iter().map(Vec::len).sum::<usize>());
    }

    #[test]
    fn test_export_is_a_pdf_named_after_the_range() {
        let filter = OrderFilter {
            from: NaiveDate::from_ymd_opt(2026, 3, 1),
            to: NaiveDate::from_ymd_opt(2026, 3, 31),
            status: None,
        };

        let export = render_export(&[order(1, 1)], &[], &filter, Utc::now()).unwrap();

        assert_eq!(export.file_name, "orders_2026-03-01_2026-03-31.pdf");
        assert_eq!(export.orders, 1);
        assert!(export.pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_write_to_saves_file() {
        let dir = std::env::temp_dir().join(format!("moto-export-{}", std::process::id()));
        let export = OrderExport {
            file_name: "orders.pdf".to_string(),
            orders: 0,
            pdf: b"%PDF-1.3".to_vec(),
        };

        let path = export.write_to(&dir).await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.3");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
