//! Pin control (pin multiplexing and electrical configuration) API.
//!
//! Like the clock API, `init` and `deinit` hand the backend the caller's
//! `Option<PinCtrlHandle>` slot so a successful `deinit` clears it.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// Pull-up/pull-down resistor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pull {
    /// No pull-up or pull-down resistor.
    #[default]
    None,
    Up,
    Down,
}

/// Output drive strength, normalized across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStrength {
    Lowest,
    /// Most common reset value
    #[default]
    Standard,
    Medium,
    High,
    Highest,
}

/// Pin controller settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinCtrlSettings {
    pub pins: u32,
    /// Number of alternate functions per pin; function 0 is GPIO
    pub functions: u32,
}

capability_table! {
    category PinCtrl(PinCtrlSettings);

    /// Operations a pin control backend may supply.
    pub struct PinCtrlOps {
        /// Select alternate function `func` on `pin`.
        fn set_function(pin: u32, func: u32) -> ();
        fn get_function(pin: u32) -> u32;
        fn set_pull(pin: u32, pull: Pull) -> ();
        fn set_drive_strength(pin: u32, strength: DriveStrength) -> ();
    }
}

pub type PinCtrlHandle = Handle<PinCtrl>;
pub type PinCtrlConfig = Config<PinCtrl>;
