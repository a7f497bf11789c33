//! Audio mixer API.
//!
//! Channels are mixer inputs; gains are in millidecibels. `route` connects
//! an input channel to an output bus.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// Mixer settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerSettings {
    /// Number of input channels
    pub inputs: u32,
    /// Number of output buses
    pub outputs: u32,
    /// Gain limits (mdB)
    pub min_gain_mdb: i32,
    pub max_gain_mdb: i32,
}

capability_table! {
    category Mixer(MixerSettings);

    /// Operations a mixer backend may supply.
    pub struct MixerOps {
        fn chan_set_gain(chan: u32, gain_mdb: i32) -> ();
        fn chan_get_gain(chan: u32) -> i32;
        fn chan_mute(chan: u32) -> ();
        fn chan_unmute(chan: u32) -> ();
        fn chan_is_muted(chan: u32) -> bool;
        /// Send input `chan` to output bus `output`.
        fn route(chan: u32, output: u32) -> ();
    }
}

pub type MixerHandle = Handle<Mixer>;
pub type MixerConfig = Config<Mixer>;
