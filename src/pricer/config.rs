//! Pricer configuration.
//!
//! Read from `config.json` in the data directory:
//!
//! ```json
//! { "save-market-state": true }
//! ```
//!
//! Missing keys take their defaults, and a missing file is the same as an
//! empty one, which leaves persistence disabled.

use super::error::PricerError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::trace;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default name of the market-state directory inside the data directory.
pub const DEFAULT_MARKET_STATE_DIR: &str = "market-state";

/// Item count at which market-state I/O fans out to worker threads.
pub const DEFAULT_PARALLEL_IO_THRESHOLD: usize = 10;

/// Runtime options of the pricing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PricerConfig {
    /// Load market state at startup and save it at shutdown.
    pub save_market_state: bool,
    /// Market-state directory, relative to the data directory.
    pub market_state_dir: String,
    /// Number of files at which loading switches from serial to parallel.
    pub parallel_io_threshold: usize,
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            save_market_state: false,
            market_state_dir: DEFAULT_MARKET_STATE_DIR.to_string(),
            parallel_io_threshold: DEFAULT_PARALLEL_IO_THRESHOLD,
        }
    }
}

impl PricerConfig {
    /// Configuration with persistence switched on and every other option at
    /// its default.
    pub fn persistent() -> Self {
        Self {
            save_market_state: true,
            ..Self::default()
        }
    }

    /// Read `config.json` from `data_dir`.
    ///
    /// # Errors
    ///
    /// [`PricerError::Io`] if the file exists but cannot be read,
    /// [`PricerError::Config`] if it is not valid configuration JSON.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self, PricerError> {
        let path = data_dir.as_ref().join(CONFIG_FILE_NAME);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("no {} found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(PricerError::io(path, e)),
        };

        serde_json::from_str(&contents).map_err(|e| PricerError::Config {
            path,
            message: e.to_string(),
        })
    }

    /// Re-read the configuration in place.
    ///
    /// On error the current values are kept.
    ///
    /// # Errors
    ///
    /// Same as [`load`](PricerConfig::load).
    pub fn reload<P: AsRef<Path>>(&mut self, data_dir: P) -> Result<(), PricerError> {
        *self = Self::load(data_dir)?;
        Ok(())
    }

    /// Write the configuration as pretty JSON to `config.json` in `data_dir`.
    ///
    /// # Errors
    ///
    /// [`PricerError::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, data_dir: P) -> Result<(), PricerError> {
        let path = data_dir.as_ref().join(CONFIG_FILE_NAME);
        let json = serde_json::to_string_pretty(self).map_err(|e| PricerError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| PricerError::io(path, e))
    }
}
