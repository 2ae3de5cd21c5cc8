//! Receipt print service
//!
//! Binds the receipt renderer to the printer dispatch manager.

use kasir_printer::{
    BleTransport, ConnectOutcome, DispatchConfig, DispatchReport, PrintResult, PrinterManager,
};
use serde::Serialize;
use shared::models::{Order, ReceiptSettings};
use tracing::instrument;

use super::receipt::ReceiptRenderer;

/// Connected printer as shown in printer pickers and status badges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterInfo {
    pub id: String,
    pub name: String,
}

pub struct PrintService<T: BleTransport> {
    printers: PrinterManager<T>,
}

impl<T: BleTransport> PrintService<T> {
    pub fn new(transport: T, config: DispatchConfig) -> Self {
        Self {
            printers: PrinterManager::with_config(transport, config),
        }
    }

    pub fn manager(&self) -> &PrinterManager<T> {
        &self.printers
    }

    /// Connected printers, oldest first
    pub fn printers(&self) -> Vec<PrinterInfo> {
        self.printers
            .endpoints()
            .iter()
            .map(|e| PrinterInfo {
                id: e.id().to_string(),
                name: e.name().to_string(),
            })
            .collect()
    }

    pub fn has_printer(&self) -> bool {
        self.printers.has_printer()
    }

    pub async fn connect(&mut self) -> bool {
        self.printers.connect().await
    }

    pub async fn try_connect(&mut self) -> PrintResult<ConnectOutcome> {
        self.printers.try_connect().await
    }

    pub fn disconnect(&mut self, printer_id: &str) {
        self.printers.disconnect(printer_id);
    }

    /// Rendered receipt text, control codes included
    pub fn preview(&self, order: &Order, settings: &ReceiptSettings) -> String {
        ReceiptRenderer::new(order, settings).render()
    }

    /// Print one receipt to `printer_id`, or the first printer
    #[instrument(skip(self, order, settings), fields(order = %order.order_number))]
    pub async fn print_receipt(
        &mut self,
        order: &Order,
        settings: &ReceiptSettings,
        printer_id: Option<&str>,
    ) -> bool {
        let payload = self.preview(order, settings).into_bytes();
        self.printers.print(&payload, printer_id).await
    }

    /// Print `copies` receipts on each printer; returns how many printed
    pub async fn print_receipt_copies(
        &mut self,
        order: &Order,
        settings: &ReceiptSettings,
        printer_ids: &[String],
        copies: u32,
    ) -> usize {
        self.print_receipt_report(order, settings, printer_ids, copies)
            .await
            .success_count()
    }

    /// [`print_receipt_copies`](Self::print_receipt_copies) with per-printer outcomes
    #[instrument(skip(self, order, settings, printer_ids), fields(order = %order.order_number))]
    pub async fn print_receipt_report(
        &mut self,
        order: &Order,
        settings: &ReceiptSettings,
        printer_ids: &[String],
        copies: u32,
    ) -> DispatchReport {
        let payload = self.preview(order, settings).into_bytes();
        self.printers
            .print_many_report(&payload, printer_ids, copies)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_printer::mock::{MockDevice, MockTransport};
    use shared::models::{OrderItem, OrderStatus};

    fn order() -> Order {
        let items = vec![OrderItem::new("1", "Nasi Putih", 2, "porsi")];
        Order {
            id: "o-1".to_string(),
            order_number: "ORD-1".to_string(),
            total_items: Order::count_items(&items),
            items,
            created_at: 1705912335000,
            status: OrderStatus::Pending,
            customer: None,
            table_number: None,
            staff_name: None,
            notes: None,
            order_type: None,
        }
    }

    async fn service_with(transport: &MockTransport, names: &[&str]) -> PrintService<MockTransport> {
        let mut service = PrintService::new(transport.clone(), DispatchConfig::default());
        for name in names {
            transport.queue_device(MockDevice::new(format!("dev-{name}"), *name));
            assert!(service.connect().await);
        }
        service
    }

    #[tokio::test]
    async fn test_print_receipt_writes_rendered_bytes() {
        let transport = MockTransport::new();
        let mut service = service_with(&transport, &["POS-A"]).await;
        let settings = ReceiptSettings::default();
        let order = order();

        assert!(service.print_receipt(&order, &settings, None).await);

        let writes = transport.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, service.preview(&order, &settings).into_bytes());
    }

    #[tokio::test]
    async fn test_print_copies_to_all_printers() {
        let transport = MockTransport::new();
        let mut service = service_with(&transport, &["POS-A", "POS-B"]).await;

        let count = service
            .print_receipt_copies(&order(), &ReceiptSettings::default(), &[], 3)
            .await;

        assert_eq!(count, 6);
    }

    #[tokio::test]
    async fn test_printers_listing_and_disconnect() {
        let transport = MockTransport::new();
        let mut service = service_with(&transport, &["POS-A", "POS-B"]).await;
        let printers = service.printers();
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].name, "POS-A");

        service.disconnect(&printers[0].id);
        service.disconnect(&printers[0].id);

        assert_eq!(service.printers(), vec![printers[1].clone()]);
    }

    #[tokio::test]
    async fn test_print_receipt_with_nothing_connected() {
        let transport = MockTransport::new();
        let mut service = service_with(&transport, &[]).await;

        assert!(!service.print_receipt(&order(), &ReceiptSettings::default(), None).await);
    }
}
