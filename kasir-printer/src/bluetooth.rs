//! Bluetooth LE transport capability
//!
//! The hardware layer is reached through [`BleTransport`]: pick a device,
//! open a GATT session on it, look up a service and a characteristic, write
//! bytes. Every step is async and fallible. Concrete backends (platform BLE
//! stacks, a web bridge, the scripted `mock` transport) implement it.

use uuid::Uuid;

use crate::error::PrintResult;

/// Generic thermal printer service (`18F0`)
pub const PRINTER_SERVICE: Uuid = Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb);
/// Write characteristic of [`PRINTER_SERVICE`] (`2AF1`)
pub const PRINTER_WRITE_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x00002af1_0000_1000_8000_00805f9b34fb);

/// ISSC / Microchip transparent UART service
pub const ISSC_SERVICE: Uuid = Uuid::from_u128(0x49535343_fe7d_4ae5_8fa9_9fafd205e455);
/// Write characteristic of [`ISSC_SERVICE`]
pub const ISSC_WRITE_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x49535343_1e4d_4bd9_ba61_23c647249616);

/// Name prefixes advertised by common thermal printer firmwares
pub const PRINTER_NAME_PREFIXES: [&str; 5] = ["POS", "Printer", "TP", "RPP", "BT"];

/// A service and the characteristic within it that accepts print data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePair {
    pub service: Uuid,
    pub characteristic: Uuid,
}

/// Known vendor protocol families, in lookup order
pub const SERVICE_PAIRS: [ServicePair; 2] = [
    ServicePair {
        service: PRINTER_SERVICE,
        characteristic: PRINTER_WRITE_CHARACTERISTIC,
    },
    ServicePair {
        service: ISSC_SERVICE,
        characteristic: ISSC_WRITE_CHARACTERISTIC,
    },
];

/// One discovery filter; a device is offered if any filter matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Device advertises this service
    Service(Uuid),
    /// Device name starts with this prefix
    NamePrefix(String),
}

impl DeviceFilter {
    pub fn matches(&self, name: Option<&str>, advertised: &[Uuid]) -> bool {
        match self {
            Self::Service(uuid) => advertised.contains(uuid),
            Self::NamePrefix(prefix) => name.is_some_and(|n| n.starts_with(prefix.as_str())),
        }
    }
}

/// Discovery request: which devices to offer, and which services the
/// session may look up after pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDeviceOptions {
    pub filters: Vec<DeviceFilter>,
    pub optional_services: Vec<Uuid>,
}

impl RequestDeviceOptions {
    /// Filters for the thermal printers the dispatch manager supports
    pub fn thermal_printers() -> Self {
        let mut filters = vec![DeviceFilter::Service(PRINTER_SERVICE)];
        filters.extend(
            PRINTER_NAME_PREFIXES
                .iter()
                .map(|p| DeviceFilter::NamePrefix((*p).to_string())),
        );

        Self {
            filters,
            optional_services: SERVICE_PAIRS.iter().map(|p| p.service).collect(),
        }
    }

    /// Whether a device with this name and advertised services is offered
    pub fn accepts(&self, name: Option<&str>, advertised: &[Uuid]) -> bool {
        self.filters.iter().any(|f| f.matches(name, advertised))
    }
}

impl Default for RequestDeviceOptions {
    fn default() -> Self {
        Self::thermal_printers()
    }
}

/// Device returned by discovery
#[derive(Debug, Clone)]
pub struct DiscoveredDevice<D> {
    /// Stable device identity (not the name; names collide)
    pub id: String,
    pub name: Option<String>,
    pub handle: D,
}

/// Hardware transport for BLE printers
#[allow(async_fn_in_trait)]
pub trait BleTransport {
    type Device;
    type Session;
    type Service;
    type Characteristic;

    /// Present a device chooser restricted by `options`
    async fn request_device(
        &self,
        options: &RequestDeviceOptions,
    ) -> PrintResult<DiscoveredDevice<Self::Device>>;

    /// Open a GATT session on a device
    async fn connect(&self, device: &Self::Device) -> PrintResult<Self::Session>;

    /// Look up a primary service within a session
    async fn primary_service(
        &self,
        session: &Self::Session,
        service: Uuid,
    ) -> PrintResult<Self::Service>;

    /// Look up a characteristic within a service
    async fn characteristic(
        &self,
        service: &Self::Service,
        characteristic: Uuid,
    ) -> PrintResult<Self::Characteristic>;

    /// Write bytes to a characteristic
    async fn write(&self, characteristic: &Self::Characteristic, data: &[u8]) -> PrintResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_printer_filters() {
        let options = RequestDeviceOptions::thermal_printers();
        assert_eq!(options.filters.len(), 6);
        assert_eq!(options.optional_services, vec![PRINTER_SERVICE, ISSC_SERVICE]);
    }

    #[test]
    fn test_accepts_by_prefix_or_service() {
        let options = RequestDeviceOptions::thermal_printers();
        assert!(options.accepts(Some("RPP02N"), &[]));
        assert!(options.accepts(Some("MPT-II"), &[PRINTER_SERVICE]));
        assert!(!options.accepts(Some("MPT-II"), &[ISSC_SERVICE]));
        assert!(!options.accepts(None, &[]));
    }

    #[test]
    fn test_uuid_constants() {
        assert_eq!(
            PRINTER_SERVICE.to_string(),
            "000018f0-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            ISSC_WRITE_CHARACTERISTIC.to_string(),
            "49535343-1e4d-4bd9-ba61-23c647249616"
        );
    }
}
