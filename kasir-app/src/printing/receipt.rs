//! Customer / kitchen receipt renderer
//!
//! Renders an `Order` into ESC/POS text for a bluetooth thermal printer.
//! Output is a pure function of the order and settings.

use chrono_tz::Tz;
use kasir_printer::{EscPosTextBuilder, chunk};
use shared::models::{Order, OrderItem, ReceiptSettings};

/// Tick-off box drawn before each item when checkbox receipts are enabled
const CHECKBOX: &str = "[ ] ";

/// Lines fed before the cut so the footer clears the cutter
const FEED_LINES: u8 = 4;

pub struct ReceiptRenderer<'a> {
    order: &'a Order,
    settings: &'a ReceiptSettings,
}

impl<'a> ReceiptRenderer<'a> {
    pub fn new(order: &'a Order, settings: &'a ReceiptSettings) -> Self {
        Self { order, settings }
    }

    pub fn width(&self) -> usize {
        self.settings.width()
    }

    pub fn render(&self) -> String {
        let mut b = EscPosTextBuilder::new(self.width());
        b.init();
        b.font_normal();

        self.render_header(&mut b);
        self.render_order_info(&mut b);
        self.render_notes(&mut b);
        b.eq_sep();
        self.render_items(&mut b);
        self.render_footer(&mut b);

        b.finalize()
    }

    /// Store name, address and phone, centered
    fn render_header(&self, b: &mut EscPosTextBuilder) {
        b.align_center();
        b.write_wrapped(&self.settings.restaurant_name);
        b.write_wrapped(&self.settings.address);
        b.write_wrapped(&format!("Tel: {}", self.settings.phone));
        b.eq_sep();
    }

    fn render_order_info(&self, b: &mut EscPosTextBuilder) {
        let order = self.order;
        b.align_left();
        b.write_line(&format!("Order: {}", order.order_number));
        b.write_line(&format!(
            "Staff: {}",
            present(&order.staff_name).unwrap_or("N/A")
        ));
        if let Some(table) = present(&order.table_number) {
            b.write_line(&format!("Meja: {}", table));
        }
        if let Some(customer) = present(&order.customer) {
            b.write_wrapped_prefixed("Pelanggan: ", customer, self.width());
        }
        b.write_line(&format!(
            "Waktu: {}",
            format_timestamp(order.created_at, self.settings.timezone)
        ));
    }

    fn render_notes(&self, b: &mut EscPosTextBuilder) {
        if let Some(notes) = present(&self.order.notes) {
            b.dash_sep();
            b.write_line("CATATAN PESANAN:");
            b.write_wrapped(notes);
        }
    }

    fn render_items(&self, b: &mut EscPosTextBuilder) {
        let count = self.order.items.len();
        for (index, item) in self.order.items.iter().enumerate() {
            self.render_item(b, item);
            if index + 1 < count {
                b.short_dash_sep();
            }
        }
    }

    /// Name (chunked), quantity line, optional note
    fn render_item(&self, b: &mut EscPosTextBuilder, item: &OrderItem) {
        let (first, rest, name_width) = if self.settings.checkbox {
            (
                CHECKBOX,
                "    ",
                self.width().saturating_sub(CHECKBOX.len()).max(1),
            )
        } else {
            ("", "  ", self.width())
        };

        for (n, segment) in chunk(&item.stock_name, name_width).into_iter().enumerate() {
            let prefix = if n == 0 { first } else { rest };
            b.write_line(&format!("{}{}", prefix, segment));
        }

        b.write_line(&format!("{} {}", item.quantity, item.unit));

        if let Some(note) = present(&item.notes) {
            b.write_line(&format!("Catatan: {}", note));
        }
    }

    fn render_footer(&self, b: &mut EscPosTextBuilder) {
        b.eq_sep();
        b.write_line(&format!("Total Item: {}", self.order.total_items));
        b.align_center();
        b.write_wrapped(&self.settings.footer);
        b.feed(FEED_LINES);
        b.cut_feed(0);
    }
}

/// Optional text that is set and non-empty
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Format unix timestamp (millis) as `d/m/yyyy, HH.MM.SS` in the given timezone
pub fn format_timestamp(ts: i64, tz: Tz) -> String {
    if let Some(dt) = chrono::DateTime::from_timestamp_millis(ts) {
        dt.with_timezone(&tz).format("%-d/%-m/%Y, %H.%M.%S").to_string()
    } else {
        "-".to_string()
    }
}
