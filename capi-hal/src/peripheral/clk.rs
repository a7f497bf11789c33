//! Clock provider API.
//!
//! A clock provider exposes a number of gated outputs derived from one
//! reference input. Output `clk_id` values index those outputs.
//!
//! `init` and `deinit` use the double-indirection convention: both receive
//! the caller's `Option<ClkHandle>` slot, and a successful `deinit` leaves it
//! `None`.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// Clock provider settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClkSettings {
    /// Reference input frequency (Hz)
    pub ref_hz: u64,
    /// Number of gated outputs
    pub outputs: u32,
    /// Highest rate any output may be programmed to (Hz)
    pub max_hz: u64,
}

capability_table! {
    category Clock(ClkSettings);

    /// Operations a clock backend may supply.
    pub struct ClkOps {
        /// Ungate output `clk_id`.
        fn enable(clk_id: u32) -> ();
        /// Gate output `clk_id`.
        fn disable(clk_id: u32) -> ();
        /// Current rate of output `clk_id` in Hz.
        fn get_rate(clk_id: u32) -> u64;
        /// Program output `clk_id` to `hz`.
        fn set_rate(clk_id: u32, hz: u64) -> ();
        /// Rate output `clk_id` would run at if asked for `hz`.
        fn round_rate(clk_id: u32, hz: u64) -> u64;
    }
}

pub type ClkHandle = Handle<Clock>;
pub type ClkConfig = Config<Clock>;
