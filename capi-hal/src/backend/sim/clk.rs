//! Simulated clock provider.
//!
//! Every output divides an internal PLL running at `max_hz` by an integer in
//! `1..=MAX_DIVIDER`, so achievable rates are `max_hz / n`.

use super::{device_id, release, require_nonzero};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::clk::{ClkConfig, ClkHandle, ClkOps, Clock};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

const MAX_DIVIDER: u64 = 1024;

#[derive(Debug, Clone, Copy)]
struct Output {
    enabled: bool,
    divider: u64,
}

#[derive(Debug)]
struct SimClk {
    pll_hz: u64,
    outputs: Vec<Output>,
}

impl SimClk {
    fn divider_for(&self, hz: u64) -> Result<u64> {
        if hz == 0 || hz > self.pll_hz {
            return Err(Error::OutOfRange {
                what: "clock rate",
                value: i64::try_from(hz).unwrap_or(i64::MAX),
                max: i64::try_from(self.pll_hz).unwrap_or(i64::MAX),
            });
        }
        // Smallest divider whose rate does not exceed the request.
        Ok(self.pll_hz.div_ceil(hz).min(MAX_DIVIDER))
    }
}

fn state(handle: &mut ClkHandle, clk_id: u32) -> Result<&mut SimClk> {
    handle.check_resource("clock output", clk_id)?;
    handle.state_mut::<SimClk>()
}

fn init(slot: &mut Option<ClkHandle>, config: &ClkConfig) -> Result<()> {
    let settings = &config.settings;
    let outputs = require_nonzero("clock outputs", settings.outputs)?;
    if settings.max_hz < settings.ref_hz || settings.ref_hz == 0 {
        return Err(Error::Config(format!(
            "clock max_hz {} below reference {}",
            settings.max_hz, settings.ref_hz
        )));
    }

    let reset_divider = (settings.max_hz / settings.ref_hz).clamp(1, MAX_DIVIDER);
    let clk = SimClk {
        pll_hz: settings.max_hz,
        outputs: vec![
            Output {
                enabled: false,
                divider: reset_divider,
            };
            outputs as usize
        ],
    };

    let id = device_id(config.identifier)?;
    debug!(
        id,
        outputs,
        pll_hz = clk.pll_hz,
        "Simulated clock provider initialized"
    );
    *slot = Some(Handle::new(id, outputs, clk));
    Ok(())
}

fn enable(handle: &mut ClkHandle, clk_id: u32) -> Result<()> {
    state(handle, clk_id)?.outputs[clk_id as usize].enabled = true;
    trace!(clk_id, "Clock output enabled");
    Ok(())
}

fn disable(handle: &mut ClkHandle, clk_id: u32) -> Result<()> {
    state(handle, clk_id)?.outputs[clk_id as usize].enabled = false;
    trace!(clk_id, "Clock output disabled");
    Ok(())
}

fn get_rate(handle: &mut ClkHandle, clk_id: u32) -> Result<u64> {
    let clk = state(handle, clk_id)?;
    Ok(clk.pll_hz / clk.outputs[clk_id as usize].divider)
}

fn set_rate(handle: &mut ClkHandle, clk_id: u32, hz: u64) -> Result<()> {
    let clk = state(handle, clk_id)?;
    let divider = clk.divider_for(hz)?;
    clk.outputs[clk_id as usize].divider = divider;
    debug!(
        clk_id,
        requested = hz,
        actual = clk.pll_hz / divider,
        "Clock rate set"
    );
    Ok(())
}

fn round_rate(handle: &mut ClkHandle, clk_id: u32, hz: u64) -> Result<u64> {
    let clk = state(handle, clk_id)?;
    Ok(clk.pll_hz / clk.divider_for(hz)?)
}

pub static SIM_CLK_OPS: ClkOps = ClkOps {
    init: Some(init),
    deinit: Some(release::<Clock>),
    enable: Some(enable),
    disable: Some(disable),
    get_rate: Some(get_rate),
    set_rate: Some(set_rate),
    round_rate: Some(round_rate),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-clk",
        description: "In-memory clock provider with integer output dividers",
        table: BackendTable::Clock(&SIM_CLK_OPS),
    }
}
