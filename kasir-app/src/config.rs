//! Application configuration
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | DATA_DIR | ./data | directory holding the JSON collections |
//! | LOG_LEVEL | info | tracing max level |
//! | LOG_DIR | (unset) | daily rolling log files when set |
//! | ENVIRONMENT | development | development \| production |
//! | DISCOVERY_TIMEOUT_MS | 60000 | printer picker / discovery limit |
//! | CONNECT_TIMEOUT_MS | 10000 | session + service lookup limit |
//! | WRITE_TIMEOUT_MS | 10000 | single payload write limit |

use std::path::PathBuf;
use std::time::Duration;

use kasir_printer::DispatchConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for `<collection>.json` files
    pub data_dir: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// Timeouts for printer hardware steps
    pub dispatch: DispatchConfig,
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = DispatchConfig::default();
        Self {
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".into())
                .into(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            dispatch: DispatchConfig {
                discovery_timeout: env_millis("DISCOVERY_TIMEOUT_MS")
                    .unwrap_or(defaults.discovery_timeout),
                connect_timeout: env_millis("CONNECT_TIMEOUT_MS")
                    .unwrap_or(defaults.connect_timeout),
                write_timeout: env_millis("WRITE_TIMEOUT_MS").unwrap_or(defaults.write_timeout),
            },
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}
