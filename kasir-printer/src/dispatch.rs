//! Printer dispatch manager
//!
//! Owns the set of connected printer endpoints and drives print payloads to
//! one or several of them. Hardware faults stop here: connect and print
//! report plain `bool` / counts, never an error.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::bluetooth::{BleTransport, RequestDeviceOptions, SERVICE_PAIRS};
use crate::error::{PrintError, PrintResult};

/// Timeouts around each hardware step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Device chooser, includes time the user spends picking
    pub discovery_timeout: Duration,
    /// Session open and each service / characteristic lookup
    pub connect_timeout: Duration,
    /// One payload write
    pub write_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            discovery_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// One paired, connected printer
#[derive(Debug, Clone)]
pub struct Endpoint<C> {
    id: String,
    name: String,
    device_id: String,
    characteristic: C,
}

impl<C> Endpoint<C> {
    /// Session-unique endpoint id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name of the device
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the underlying device
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn characteristic(&self) -> &C {
        &self.characteristic
    }
}

/// Result of a successful connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// New endpoint added with this id
    Added(String),
    /// The device was already connected as this endpoint
    AlreadyConnected(String),
}

impl ConnectOutcome {
    pub fn endpoint_id(&self) -> &str {
        match self {
            Self::Added(id) | Self::AlreadyConnected(id) => id,
        }
    }
}

/// One (endpoint, copy) print attempt within a fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintAttempt {
    pub endpoint_id: String,
    /// 1-based copy number
    pub copy: u32,
    pub success: bool,
}

/// Outcome of a fan-out print, in dispatch order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempts: Vec<PrintAttempt>,
}

impl DispatchReport {
    pub fn success_count(&self) -> usize {
        self.attempts.iter().filter(|a| a.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.attempts.len() - self.success_count()
    }

    /// Successful copies for one endpoint
    pub fn successes_for(&self, endpoint_id: &str) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.success && a.endpoint_id == endpoint_id)
            .count()
    }
}

/// Connected printer set plus dispatch policy
///
/// Endpoints are kept in insertion order. The set only changes through
/// [`connect`](Self::connect) and [`disconnect`](Self::disconnect); a printer
/// that silently drops out of range stays listed until one of those runs.
pub struct PrinterManager<T: BleTransport> {
    transport: T,
    config: DispatchConfig,
    endpoints: Vec<Endpoint<T::Characteristic>>,
}

impl<T: BleTransport> PrinterManager<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DispatchConfig::default())
    }

    pub fn with_config(transport: T, config: DispatchConfig) -> Self {
        Self {
            transport,
            config,
            endpoints: Vec::new(),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Connected endpoints, oldest first
    pub fn endpoints(&self) -> &[Endpoint<T::Characteristic>] {
        &self.endpoints
    }

    pub fn endpoint(&self, id: &str) -> Option<&Endpoint<T::Characteristic>> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    /// Whether any printer is connected
    pub fn has_printer(&self) -> bool {
        !self.endpoints.is_empty()
    }

    /// Discover, pair and register a printer
    ///
    /// Returns `false` on any failure (cancelled picker, no supported
    /// service, unnamed device, timeout).
    pub async fn connect(&mut self) -> bool {
        match self.try_connect().await {
            Ok(outcome) => {
                info!(endpoint_id = outcome.endpoint_id(), "Printer connected");
                true
            }
            Err(e) => {
                warn!(error = %e, "Bluetooth connection failed");
                false
            }
        }
    }

    /// [`connect`](Self::connect) with the failure reason and outcome kept
    #[instrument(skip(self), fields(connected = self.endpoints.len()))]
    pub async fn try_connect(&mut self) -> PrintResult<ConnectOutcome> {
        let options = RequestDeviceOptions::thermal_printers();
        let device = timed(
            "discovery",
            self.config.discovery_timeout,
            self.transport.request_device(&options),
        )
        .await?;
        debug!(device_id = %device.id, name = ?device.name, "Device selected");

        let session = timed(
            "connect",
            self.config.connect_timeout,
            self.transport.connect(&device.handle),
        )
        .await?;

        let characteristic = self.lookup_characteristic(&session).await?;

        let name = device
            .name
            .ok_or_else(|| PrintError::UnnamedDevice(device.id.clone()))?;

        if let Some(existing) = self.endpoints.iter().find(|e| e.device_id == device.id) {
            info!(endpoint_id = %existing.id, "Device already connected");
            return Ok(ConnectOutcome::AlreadyConnected(existing.id.clone()));
        }

        let id = self.next_endpoint_id(&name);
        self.endpoints.push(Endpoint {
            id: id.clone(),
            name,
            device_id: device.id,
            characteristic,
        });

        Ok(ConnectOutcome::Added(id))
    }

    /// Try each known service pair in order
    async fn lookup_characteristic(
        &self,
        session: &T::Session,
    ) -> PrintResult<T::Characteristic> {
        let mut last_error = None;

        for pair in SERVICE_PAIRS {
            let lookup = async {
                let service = timed(
                    "service lookup",
                    self.config.connect_timeout,
                    self.transport.primary_service(session, pair.service),
                )
                .await?;
                timed(
                    "characteristic lookup",
                    self.config.connect_timeout,
                    self.transport.characteristic(&service, pair.characteristic),
                )
                .await
            };

            match lookup.await {
                Ok(characteristic) => {
                    debug!(service = %pair.service, "Write characteristic found");
                    return Ok(characteristic);
                }
                Err(e) => {
                    debug!(service = %pair.service, error = %e, "Service pair unavailable");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => PrintError::ServiceNotFound(e.to_string()),
            None => PrintError::ServiceNotFound("no known service pairs".to_string()),
        })
    }

    /// `<name>-<unix millis>`, suffixed further if that is already taken
    fn next_endpoint_id(&self, name: &str) -> String {
        self.unique_id(format!("{}-{}", name, chrono::Utc::now().timestamp_millis()))
    }

    fn unique_id(&self, base: String) -> String {
        let mut id = base.clone();
        let mut n = 1;
        while self.endpoints.iter().any(|e| e.id == id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        id
    }

    /// Forget an endpoint. Unknown ids are ignored.
    pub fn disconnect(&mut self, endpoint_id: &str) {
        let before = self.endpoints.len();
        self.endpoints.retain(|e| e.id != endpoint_id);
        if self.endpoints.len() < before {
            info!(endpoint_id, "Printer disconnected");
        }
    }

    /// Print a payload to one printer
    ///
    /// Target: `endpoint_id` if connected, else the first endpoint, else a
    /// fresh connect. A failed write gets exactly one reconnect and one
    /// retry against the first endpoint.
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    pub async fn print(&mut self, payload: &[u8], endpoint_id: Option<&str>) -> bool {
        let Some(index) = self.resolve_target(endpoint_id).await else {
            warn!("No printer available");
            return false;
        };

        match self.write_to(index, payload).await {
            Ok(()) => {
                info!(endpoint_id = %self.endpoints[index].id, "Print job sent");
                true
            }
            Err(e) => {
                warn!(endpoint_id = %self.endpoints[index].id, error = %e, "Print failed, reconnecting");
                self.retry_after_reconnect(payload).await
            }
        }
    }

    async fn resolve_target(&mut self, endpoint_id: Option<&str>) -> Option<usize> {
        if let Some(id) = endpoint_id
            && let Some(index) = self.endpoints.iter().position(|e| e.id == id)
        {
            return Some(index);
        }
        if !self.endpoints.is_empty() {
            return Some(0);
        }
        if self.connect().await && !self.endpoints.is_empty() {
            return Some(0);
        }
        None
    }

    async fn retry_after_reconnect(&mut self, payload: &[u8]) -> bool {
        if !self.connect().await || self.endpoints.is_empty() {
            warn!("Reconnect failed, giving up");
            return false;
        }

        match self.write_to(0, payload).await {
            Ok(()) => {
                info!(endpoint_id = %self.endpoints[0].id, "Print job sent on retry");
                true
            }
            Err(e) => {
                warn!(endpoint_id = %self.endpoints[0].id, error = %e, "Retry print failed");
                false
            }
        }
    }

    async fn write_to(&self, index: usize, payload: &[u8]) -> PrintResult<()> {
        let endpoint = &self.endpoints[index];
        timed(
            "write",
            self.config.write_timeout,
            self.transport.write(&endpoint.characteristic, payload),
        )
        .await
    }

    /// Fan a payload out to several printers, `copies` times each
    ///
    /// Returns how many (endpoint, copy) prints succeeded.
    pub async fn print_many(&mut self, payload: &[u8], endpoint_ids: &[String], copies: u32) -> usize {
        self.print_many_report(payload, endpoint_ids, copies)
            .await
            .success_count()
    }

    /// [`print_many`](Self::print_many) with every attempt's outcome
    ///
    /// An empty `endpoint_ids` means all connected endpoints. `copies` below
    /// one is treated as one. Dispatch is sequential, endpoint by endpoint,
    /// and one endpoint failing does not stop the rest.
    #[instrument(skip(self, payload, endpoint_ids), fields(bytes = payload.len()))]
    pub async fn print_many_report(
        &mut self,
        payload: &[u8],
        endpoint_ids: &[String],
        copies: u32,
    ) -> DispatchReport {
        let targets: Vec<String> = if endpoint_ids.is_empty() {
            self.endpoints.iter().map(|e| e.id.clone()).collect()
        } else {
            endpoint_ids.to_vec()
        };
        let copies = copies.max(1);

        let mut report = DispatchReport::default();
        for endpoint_id in targets {
            for copy in 1..=copies {
                let success = self.print(payload, Some(&endpoint_id)).await;
                report.attempts.push(PrintAttempt {
                    endpoint_id: endpoint_id.clone(),
                    copy,
                    success,
                });
            }
        }

        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Fan-out print finished"
        );
        report
    }
}

/// Bound a hardware step by `limit`
async fn timed<R>(
    step: &str,
    limit: Duration,
    fut: impl Future<Output = PrintResult<R>>,
) -> PrintResult<R> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| PrintError::Timeout(format!("{} exceeded {:?}", step, limit)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::{ISSC_SERVICE, PRINTER_SERVICE};
    use crate::mock::{MockDevice, MockTransport};

    fn manager(transport: &MockTransport) -> PrinterManager<MockTransport> {
        PrinterManager::new(transport.clone())
    }

    async fn connected(transport: &MockTransport, names: &[&str]) -> PrinterManager<MockTransport> {
        for name in names {
            transport.queue_device(MockDevice::new(format!("dev-{name}"), *name));
        }
        let mut m = manager(transport);
        for _ in names {
            assert!(m.connect().await);
        }
        m
    }

    #[tokio::test]
    async fn test_connect_adds_endpoint() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::new("AA:BB", "RPP02N"));
        let mut m = manager(&transport);

        let outcome = m.try_connect().await.unwrap();

        let ConnectOutcome::Added(id) = outcome else {
            panic!("expected a new endpoint");
        };
        assert!(id.starts_with("RPP02N-"));
        assert_eq!(m.endpoints().len(), 1);
        assert_eq!(m.endpoints()[0].name(), "RPP02N");
        assert_eq!(m.endpoints()[0].device_id(), "AA:BB");
        assert!(m.has_printer());
    }

    #[tokio::test]
    async fn test_connect_falls_back_to_second_service() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::new("AA:BB", "BT-Printer").with_services(&[ISSC_SERVICE]));
        let mut m = manager(&transport);

        assert!(m.connect().await);
        assert_eq!(m.endpoints()[0].characteristic().service, ISSC_SERVICE);
    }

    #[tokio::test]
    async fn test_connect_without_supported_service_fails() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::new("AA:BB", "POS-58").with_services(&[]));
        let mut m = manager(&transport);

        let err = m.try_connect().await.unwrap_err();
        assert!(matches!(err, PrintError::ServiceNotFound(_)));
        assert!(m.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_connect_cancelled_picker_fails() {
        let transport = MockTransport::new();
        let mut m = manager(&transport);

        assert!(!m.connect().await);
        assert!(m.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_connect_session_failure_leaves_set_untouched() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::new("AA:BB", "POS-58").failing_connect());
        let mut m = manager(&transport);

        assert!(!m.connect().await);
        assert!(m.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_unnamed_device_is_rejected() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::unnamed("AA:BB"));
        let mut m = manager(&transport);

        let err = m.try_connect().await.unwrap_err();
        assert!(matches!(err, PrintError::UnnamedDevice(_)));
        assert!(m.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_same_device_twice_is_one_endpoint() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::new("AA:BB", "RPP02N"));
        transport.queue_device(MockDevice::new("AA:BB", "RPP02N"));
        let mut m = manager(&transport);

        let first = m.try_connect().await.unwrap();
        let second = m.try_connect().await.unwrap();

        assert_eq!(
            second,
            ConnectOutcome::AlreadyConnected(first.endpoint_id().to_string())
        );
        assert_eq!(m.endpoints().len(), 1);
    }

    #[tokio::test]
    async fn test_same_name_different_devices_are_distinct() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::new("AA:01", "POS-58"));
        transport.queue_device(MockDevice::new("AA:02", "POS-58"));
        let mut m = manager(&transport);

        assert!(m.connect().await);
        assert!(m.connect().await);

        assert_eq!(m.endpoints().len(), 2);
        assert_ne!(m.endpoints()[0].id(), m.endpoints()[1].id());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_is_noop() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A"]).await;
        let before: Vec<String> = m.endpoints().iter().map(|e| e.id().to_string()).collect();

        m.disconnect("missing-123");

        let after: Vec<String> = m.endpoints().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_disconnect_removes_endpoint() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A", "POS-B"]).await;
        let first = m.endpoints()[0].id().to_string();

        m.disconnect(&first);

        assert_eq!(m.endpoints().len(), 1);
        assert_eq!(m.endpoints()[0].name(), "POS-B");
    }

    #[tokio::test]
    async fn test_print_to_explicit_endpoint() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A", "POS-B"]).await;
        let second = m.endpoints()[1].id().to_string();

        assert!(m.print(b"hello", Some(&second)).await);

        assert_eq!(transport.writes(), vec![("dev-POS-B".to_string(), b"hello".to_vec())]);
    }

    #[tokio::test]
    async fn test_print_unknown_id_uses_first_endpoint() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A", "POS-B"]).await;

        assert!(m.print(b"hello", Some("gone-1")).await);

        assert_eq!(transport.writes()[0].0, "dev-POS-A");
    }

    #[tokio::test]
    async fn test_print_without_printers_and_failed_connect() {
        let transport = MockTransport::new();
        let mut m = manager(&transport);

        assert!(!m.print(b"hello", None).await);
        assert!(transport.writes().is_empty());
    }

    #[tokio::test]
    async fn test_print_without_printers_connects_first() {
        let transport = MockTransport::new();
        transport.queue_device(MockDevice::new("AA:BB", "RPP02N"));
        let mut m = manager(&transport);

        assert!(m.print(b"hello", None).await);
        assert_eq!(m.endpoints().len(), 1);
        assert_eq!(transport.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_retries_once_after_reconnect() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A"]).await;
        transport.fail_next_writes(1);
        transport.queue_device(MockDevice::new("dev-POS-A", "POS-A"));

        assert!(m.print(b"hello", None).await);

        assert_eq!(transport.write_attempts(), 2);
        assert_eq!(transport.writes().len(), 1);
        assert_eq!(m.endpoints().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_failure_is_final() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A"]).await;
        transport.fail_next_writes(5);
        transport.queue_device(MockDevice::new("dev-POS-A", "POS-A"));

        assert!(!m.print(b"hello", None).await);

        assert_eq!(transport.write_attempts(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_with_failed_reconnect() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A"]).await;
        transport.fail_next_writes(1);

        assert!(!m.print(b"hello", None).await);

        assert_eq!(transport.write_attempts(), 1);
    }

    #[tokio::test]
    async fn test_print_many_copies_times_endpoints() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A", "POS-B"]).await;

        let count = m.print_many(b"receipt", &[], 3).await;

        assert_eq!(count, 6);
        let devices: Vec<String> = transport.writes().into_iter().map(|(d, _)| d).collect();
        assert_eq!(
            devices,
            vec!["dev-POS-A", "dev-POS-A", "dev-POS-A", "dev-POS-B", "dev-POS-B", "dev-POS-B"]
        );
    }

    #[tokio::test]
    async fn test_print_many_zero_copies_prints_once() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A"]).await;

        assert_eq!(m.print_many(b"receipt", &[], 0).await, 1);
    }

    #[tokio::test]
    async fn test_print_many_with_no_printers() {
        let transport = MockTransport::new();
        let mut m = manager(&transport);

        let report = m.print_many_report(b"receipt", &[], 2).await;

        assert!(report.attempts.is_empty());
        assert_eq!(report.success_count(), 0);
    }

    #[tokio::test]
    async fn test_print_many_continues_past_broken_endpoint() {
        let transport = MockTransport::new();
        let mut m = connected(&transport, &["POS-A", "POS-B"]).await;
        let ids: Vec<String> = m.endpoints().iter().map(|e| e.id().to_string()).collect();
        transport.break_device("dev-POS-A");

        let report = m.print_many_report(b"receipt", &ids, 2).await;

        assert_eq!(report.attempts.len(), 4);
        assert_eq!(report.successes_for(&ids[0]), 0);
        assert_eq!(report.successes_for(&ids[1]), 2);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_write_times_out() {
        let transport = MockTransport::new();
        let mut m = PrinterManager::with_config(
            transport.clone(),
            DispatchConfig {
                write_timeout: Duration::from_millis(50),
                ..DispatchConfig::default()
            },
        );
        transport.queue_device(MockDevice::new("AA:BB", "POS-58"));
        assert!(m.connect().await);
        transport.hang_writes(true);

        assert!(!m.print(b"hello", None).await);
        assert!(transport.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_discovery_times_out() {
        let transport = MockTransport::new();
        transport.hang_discovery(true);
        let mut m = manager(&transport);

        let err = m.try_connect().await.unwrap_err();
        assert!(matches!(err, PrintError::Timeout(_)));
    }

    #[test]
    fn test_endpoint_id_collision_gets_suffix() {
        let transport = MockTransport::new();
        let mut m = manager(&transport);
        m.endpoints.push(Endpoint {
            id: "POS-1700000000000".to_string(),
            name: "POS".to_string(),
            device_id: "d1".to_string(),
            characteristic: crate::mock::MockCharacteristic {
                device_id: "d1".to_string(),
                service: PRINTER_SERVICE,
            },
        });

        assert_eq!(
            m.unique_id("POS-1700000000000".to_string()),
            "POS-1700000000000-1"
        );
        assert_eq!(m.unique_id("POS-1700000000001".to_string()), "POS-1700000000001");
    }
}
