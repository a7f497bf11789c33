//! Board descriptions.
//!
//! A board is a named list of devices. Each device names the backend that
//! drives it, the identifier handed to that backend and the category
//! settings, which stay as raw JSON until bring-up knows which settings type
//! to decode them into.
//!
//! ```json
//! {
//!   "name": "devkit",
//!   "devices": [
//!     {
//!       "name": "pll0",
//!       "category": "clock",
//!       "backend": "sim-clk",
//!       "identifier": 1073741824,
//!       "settings": { "ref_hz": 25000000, "outputs": 4, "max_hz": 1000000000 }
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::category::CategoryKind;
use crate::error::{Error, Result};

/// Devices making up one board.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardConfig {
    /// Board name, used in log messages
    pub name: String,

    /// Devices, brought up in order and shut down in reverse
    pub devices: Vec<DeviceConfig>,
}

/// One device on a board.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Name the device is looked up by after bring-up
    pub name: String,

    pub category: CategoryKind,

    /// Registered backend name
    pub backend: String,

    /// Base address, bus number or other backend-defined selector
    #[serde(default)]
    pub identifier: u64,

    /// Category settings, decoded at bring-up
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl BoardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BoardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        for (i, device) in self.devices.iter().enumerate() {
            if device.name.is_empty() {
                return Err(Error::Config(format!("device {} has no name", i)));
            }
            if self.devices[..i].iter().any(|d| d.name == device.name) {
                return Err(Error::Config(format!(
                    "duplicate device name {:?}",
                    device.name
                )));
            }
        }
        Ok(())
    }
}
