//! I2S serial audio port API.
//!
//! An I2S controller exposes `resource_count` ports; each port has an
//! independent receive and transmit direction.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// Data direction on a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rx,
    Tx,
}

/// Frame format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum I2sFormat {
    /// Philips I2S, data delayed one bit clock from the frame edge
    #[default]
    Standard,
    LeftJustified,
    RightJustified,
    /// Time-division multiplexed, `slots` channels per frame
    Tdm { slots: u8 },
}

/// Per-port, per-direction stream configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2sPortConfig {
    pub sample_rate_hz: u32,
    /// Bits per sample word
    pub word_bits: u8,
    pub format: I2sFormat,
    /// Port drives BCLK and frame sync
    #[serde(default)]
    pub master: bool,
}

/// I2S controller settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I2sSettings {
    /// Number of ports
    pub ports: u32,
    /// Master clock fed to the controller (Hz)
    pub mclk_hz: u32,
}

capability_table! {
    category I2s(I2sSettings);

    /// Operations an I2S backend may supply.
    pub struct I2sOps {
        /// Apply `config` to one direction of `port`.
        fn port_config(port: u32, dir: Direction, config: &I2sPortConfig) -> ();
        /// Start streaming on one direction of `port`.
        fn port_enable(port: u32, dir: Direction) -> ();
        /// Stop streaming on one direction of `port`.
        fn port_disable(port: u32, dir: Direction) -> ();
        fn port_is_enabled(port: u32, dir: Direction) -> bool;
    }
}

pub type I2sHandle = Handle<I2s>;
pub type I2sConfig = Config<I2s>;
