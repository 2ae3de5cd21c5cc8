//! Application facade
//!
//! Owns the state store and the print service. Printing never fails a
//! store operation: print outcomes are reported as booleans and counts.

use kasir_printer::{BleTransport, ConnectOutcome, DispatchConfig};
use shared::models::{Order, OrderCreate, SettingsUpdate};
use tracing::instrument;

use crate::error::{StoreError, StoreResult};
use crate::printing::{PrintService, PrinterInfo};
use crate::store::{AppStore, StatePersistence};

pub struct App<P: StatePersistence, T: BleTransport> {
    store: AppStore<P>,
    printing: PrintService<T>,
}

impl<P: StatePersistence, T: BleTransport> App<P, T> {
    pub fn new(store: AppStore<P>, transport: T, config: DispatchConfig) -> Self {
        Self {
            store,
            printing: PrintService::new(transport, config),
        }
    }

    pub fn store(&self) -> &AppStore<P> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AppStore<P> {
        &mut self.store
    }

    pub fn printing(&self) -> &PrintService<T> {
        &self.printing
    }

    // ========== Printers ==========

    /// Pair a printer and remember its name in settings
    #[instrument(skip(self))]
    pub async fn connect_printer(&mut self) -> bool {
        match self.printing.try_connect().await {
            Ok(ConnectOutcome::Added(id)) => {
                let name = self
                    .printing
                    .manager()
                    .endpoint(&id)
                    .map(|e| e.name().to_string())
                    .unwrap_or_default();
                if let Err(e) = self.store.update_settings(SettingsUpdate {
                    bluetooth_printer: Some(name),
                    ..Default::default()
                }) {
                    tracing::warn!(error = %e, "Failed to record connected printer");
                }
                true
            }
            Ok(ConnectOutcome::AlreadyConnected(_)) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Printer connection failed");
                false
            }
        }
    }

    pub fn disconnect_printer(&mut self, printer_id: &str) {
        self.printing.disconnect(printer_id);
    }

    pub fn printers(&self) -> Vec<PrinterInfo> {
        self.printing.printers()
    }

    // ========== Receipts ==========

    /// Receipt text for an order under the current settings
    pub fn preview(&self, order: &Order) -> String {
        self.printing
            .preview(order, &self.store.settings().receipt_settings())
    }

    pub async fn print_receipt(&mut self, order: &Order, printer_id: Option<&str>) -> bool {
        let settings = self.store.settings().receipt_settings();
        self.printing.print_receipt(order, &settings, printer_id).await
    }

    /// Print a stored order by id
    pub async fn print_order(&mut self, order_id: &str, printer_id: Option<&str>) -> StoreResult<bool> {
        let order = self
            .store
            .order(order_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("order {order_id}")))?;
        Ok(self.print_receipt(&order, printer_id).await)
    }

    /// Print `copies` receipts on each listed printer (all when empty)
    pub async fn print_receipt_copies(
        &mut self,
        order: &Order,
        printer_ids: &[String],
        copies: u32,
    ) -> usize {
        let settings = self.store.settings().receipt_settings();
        self.printing
            .print_receipt_copies(order, &settings, printer_ids, copies)
            .await
    }

    // ========== Orders ==========

    /// Record an order and auto-print it when enabled
    ///
    /// With `auto_print` on and at least one printer connected, one receipt
    /// goes to the first printer.
    #[instrument(skip(self, data))]
    pub async fn create_order(&mut self, data: OrderCreate) -> StoreResult<Order> {
        let order = self.store.add_order(data)?;

        let settings = self.store.settings();
        if settings.auto_print && self.printing.has_printer() {
            let receipt = settings.receipt_settings();
            if self.printing.print_receipt(&order, &receipt, None).await {
                tracing::info!(order_number = %order.order_number, "Receipt auto-printed");
            } else {
                tracing::warn!(order_number = %order.order_number, "Receipt auto-print failed");
            }
        }

        Ok(order)
    }
}
