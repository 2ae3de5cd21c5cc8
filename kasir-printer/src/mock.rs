//! Scripted in-memory BLE transport
//!
//! Devices are handed out by the picker in the order they were queued; an
//! empty queue behaves like a cancelled picker. Writes are recorded per
//! device and can be made to fail or hang.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::bluetooth::{
    BleTransport, DiscoveredDevice, PRINTER_SERVICE, RequestDeviceOptions, SERVICE_PAIRS,
};
use crate::error::{PrintError, PrintResult};

/// Device the mock picker can return
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub id: String,
    pub name: Option<String>,
    /// Services advertised and available after pairing
    pub services: Vec<Uuid>,
    pub fail_connect: bool,
}

impl MockDevice {
    /// Named device exposing the generic printer service
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            services: vec![PRINTER_SERVICE],
            fail_connect: false,
        }
    }

    pub fn unnamed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            services: vec![PRINTER_SERVICE],
            fail_connect: false,
        }
    }

    pub fn with_services(mut self, services: &[Uuid]) -> Self {
        self.services = services.to_vec();
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MockService {
    pub device_id: String,
    pub service: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCharacteristic {
    pub device_id: String,
    pub service: Uuid,
}

#[derive(Debug, Default)]
struct MockState {
    devices: VecDeque<MockDevice>,
    hang_discovery: bool,
    hang_writes: bool,
    fail_writes: usize,
    broken: HashSet<String>,
    writes: Vec<(String, Vec<u8>)>,
    write_attempts: usize,
}

/// Cloneable handle; clones share state so a test can keep one while the
/// manager owns another
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next device the picker returns
    pub fn queue_device(&self, device: MockDevice) {
        self.state.lock().devices.push_back(device);
    }

    /// Fail the next `n` writes
    pub fn fail_next_writes(&self, n: usize) {
        self.state.lock().fail_writes = n;
    }

    /// Fail every write to this device
    pub fn break_device(&self, device_id: &str) {
        self.state.lock().broken.insert(device_id.to_string());
    }

    pub fn hang_writes(&self, hang: bool) {
        self.state.lock().hang_writes = hang;
    }

    pub fn hang_discovery(&self, hang: bool) {
        self.state.lock().hang_discovery = hang;
    }

    /// Successful writes as (device id, bytes), in order
    pub fn writes(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().writes.clone()
    }

    /// All write calls, failed ones included
    pub fn write_attempts(&self) -> usize {
        self.state.lock().write_attempts
    }
}

impl BleTransport for MockTransport {
    type Device = MockDevice;
    type Session = MockDevice;
    type Service = MockService;
    type Characteristic = MockCharacteristic;

    async fn request_device(
        &self,
        options: &RequestDeviceOptions,
    ) -> PrintResult<DiscoveredDevice<MockDevice>> {
        let picked = {
            let mut state = self.state.lock();
            if state.hang_discovery {
                None
            } else {
                Some(state.devices.pop_front())
            }
        };

        let Some(picked) = picked else {
            return std::future::pending().await;
        };
        let device = picked
            .ok_or_else(|| PrintError::Discovery("User cancelled the requestDevice() chooser".into()))?;

        if !options.accepts(device.name.as_deref(), &device.services) {
            return Err(PrintError::Discovery(format!(
                "{} does not match any filter",
                device.id
            )));
        }

        Ok(DiscoveredDevice {
            id: device.id.clone(),
            name: device.name.clone(),
            handle: device,
        })
    }

    async fn connect(&self, device: &MockDevice) -> PrintResult<MockDevice> {
        if device.fail_connect {
            return Err(PrintError::Connection(format!("{}: GATT server unreachable", device.id)));
        }
        Ok(device.clone())
    }

    async fn primary_service(&self, session: &MockDevice, service: Uuid) -> PrintResult<MockService> {
        if session.services.contains(&service) {
            Ok(MockService {
                device_id: session.id.clone(),
                service,
            })
        } else {
            Err(PrintError::ServiceNotFound(service.to_string()))
        }
    }

    async fn characteristic(
        &self,
        service: &MockService,
        characteristic: Uuid,
    ) -> PrintResult<MockCharacteristic> {
        let known = SERVICE_PAIRS
            .iter()
            .any(|p| p.service == service.service && p.characteristic == characteristic);
        if !known {
            return Err(PrintError::ServiceNotFound(characteristic.to_string()));
        }
        Ok(MockCharacteristic {
            device_id: service.device_id.clone(),
            service: service.service,
        })
    }

    async fn write(&self, characteristic: &MockCharacteristic, data: &[u8]) -> PrintResult<()> {
        let outcome = {
            let mut state = self.state.lock();
            state.write_attempts += 1;
            if state.hang_writes {
                None
            } else if state.broken.contains(&characteristic.device_id) {
                Some(Err(PrintError::Write(format!(
                    "{}: GATT operation failed",
                    characteristic.device_id
                ))))
            } else if state.fail_writes > 0 {
                state.fail_writes -= 1;
                Some(Err(PrintError::Write(format!(
                    "{}: device disconnected",
                    characteristic.device_id
                ))))
            } else {
                state
                    .writes
                    .push((characteristic.device_id.clone(), data.to_vec()));
                Some(Ok(()))
            }
        };

        match outcome {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}
