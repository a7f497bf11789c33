//! Watchdog timer API.
//!
//! A watchdog may have several channels, each of which must be fed before
//! the timeout elapses. [`isr`] is meant to be called from the expiry
//! interrupt; it reports nothing and does nothing when the backend has no
//! interrupt handler.
//!
//! Nothing here serializes [`isr`] against foreground calls such as
//! [`feed`] on the same handle. Share the handle through
//! [`Handle::into_shared`](crate::handle::Handle::into_shared) when both
//! contexts need it.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// Expiry callback; receives the id of the handle that expired.
pub type WdtCallback = fn(u32);

/// Watchdog settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WdtSettings {
    /// Number of independently fed channels
    #[serde(default = "default_channels")]
    pub channels: u32,
    pub min_timeout_ms: u32,
    pub max_timeout_ms: u32,
    pub default_timeout_ms: u32,
}

fn default_channels() -> u32 {
    1
}

capability_table! {
    category Watchdog(WdtSettings);

    /// Operations a watchdog backend may supply.
    pub struct WdtOps {
        /// Arm the watchdog with `timeout_ms`.
        fn start(timeout_ms: u32) -> ();
        fn stop() -> ();
        /// Restart the countdown on every channel.
        fn feed() -> ();
        /// Restart the countdown on one channel.
        fn feed_chan(chan: u32) -> ();
        fn set_timeout(timeout_ms: u32) -> ();
        fn get_timeout() -> u32;
        fn set_callback(callback: WdtCallback) -> ();
    }

    void {
        /// Service the watchdog interrupt.
        fn isr();
    }
}

pub type WdtHandle = Handle<Watchdog>;
pub type WdtConfig = Config<Watchdog>;
