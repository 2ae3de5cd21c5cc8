//! Error types for the printer library

use thiserror::Error;

/// Printer error types
///
/// These never leave [`PrinterManager`](crate::PrinterManager)'s public
/// print/connect operations, which report plain success or failure.
#[derive(Debug, Error)]
pub enum PrintError {
    /// No device selected (picker cancelled, nothing compatible in range)
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Opening a session on the selected device failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// None of the known service/characteristic pairs is available
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// Device was found but does not expose a name
    #[error("Device has no name: {0}")]
    UnnamedDevice(String),

    /// Characteristic write rejected or device unreachable
    #[error("Write failed: {0}")]
    Write(String),

    /// A hardware step did not complete in time
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
