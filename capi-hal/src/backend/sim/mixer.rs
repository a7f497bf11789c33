//! Simulated mixer.

use super::{device_id, release, require_nonzero};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::mixer::{Mixer, MixerConfig, MixerHandle, MixerOps};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

#[derive(Debug, Default, Clone, Copy)]
struct Input {
    gain_mdb: i32,
    muted: bool,
    output: Option<u32>,
}

#[derive(Debug)]
struct SimMixer {
    outputs: u32,
    min_gain_mdb: i32,
    max_gain_mdb: i32,
    inputs: Vec<Input>,
}

fn input(handle: &mut MixerHandle, chan: u32) -> Result<&mut Input> {
    handle.check_resource("mixer channel", chan)?;
    Ok(&mut handle.state_mut::<SimMixer>()?.inputs[chan as usize])
}

fn init(slot: &mut Option<MixerHandle>, config: &MixerConfig) -> Result<()> {
    let settings = &config.settings;
    let inputs = require_nonzero("mixer inputs", settings.inputs)?;
    let outputs = require_nonzero("mixer outputs", settings.outputs)?;
    if settings.min_gain_mdb > 0 || settings.max_gain_mdb < 0 {
        return Err(Error::Config(format!(
            "mixer gain range {}..={} mdB must include 0",
            settings.min_gain_mdb, settings.max_gain_mdb
        )));
    }

    let mixer = SimMixer {
        outputs,
        min_gain_mdb: settings.min_gain_mdb,
        max_gain_mdb: settings.max_gain_mdb,
        inputs: vec![Input::default(); inputs as usize],
    };
    let id = device_id(config.identifier)?;
    debug!(id, inputs, outputs, "Simulated mixer initialized");
    *slot = Some(Handle::new(id, inputs, mixer));
    Ok(())
}

fn chan_set_gain(handle: &mut MixerHandle, chan: u32, gain_mdb: i32) -> Result<()> {
    handle.check_resource("mixer channel", chan)?;
    let mixer = handle.state_mut::<SimMixer>()?;
    if !(mixer.min_gain_mdb..=mixer.max_gain_mdb).contains(&gain_mdb) {
        return Err(Error::OutOfRange {
            what: "mixer gain",
            value: gain_mdb.into(),
            max: mixer.max_gain_mdb.into(),
        });
    }
    mixer.inputs[chan as usize].gain_mdb = gain_mdb;
    trace!(chan, gain_mdb, "Mixer gain set");
    Ok(())
}

fn chan_get_gain(handle: &mut MixerHandle, chan: u32) -> Result<i32> {
    Ok(input(handle, chan)?.gain_mdb)
}

fn chan_mute(handle: &mut MixerHandle, chan: u32) -> Result<()> {
    input(handle, chan)?.muted = true;
    Ok(())
}

fn chan_unmute(handle: &mut MixerHandle, chan: u32) -> Result<()> {
    input(handle, chan)?.muted = false;
    Ok(())
}

fn chan_is_muted(handle: &mut MixerHandle, chan: u32) -> Result<bool> {
    Ok(input(handle, chan)?.muted)
}

fn route(handle: &mut MixerHandle, chan: u32, output: u32) -> Result<()> {
    let outputs = handle.state::<SimMixer>()?.outputs;
    if output >= outputs {
        return Err(Error::OutOfRange {
            what: "mixer output",
            value: output.into(),
            max: (outputs - 1).into(),
        });
    }
    input(handle, chan)?.output = Some(output);
    debug!(chan, output, "Mixer input routed");
    Ok(())
}

pub static SIM_MIXER_OPS: MixerOps = MixerOps {
    init: Some(init),
    deinit: Some(release::<Mixer>),
    chan_set_gain: Some(chan_set_gain),
    chan_get_gain: Some(chan_get_gain),
    chan_mute: Some(chan_mute),
    chan_unmute: Some(chan_unmute),
    chan_is_muted: Some(chan_is_muted),
    route: Some(route),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-mixer",
        description: "In-memory mixer with per-input gain, mute and routing",
        table: BackendTable::Mixer(&SIM_MIXER_OPS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::mixer::{self, MixerSettings};

    fn bring_up() -> MixerHandle {
        let config = MixerConfig::new(
            0,
            &SIM_MIXER_OPS,
            MixerSettings {
                inputs: 4,
                outputs: 2,
                min_gain_mdb: -96_000,
                max_gain_mdb: 12_000,
            },
        );
        let mut slot = None;
        mixer::init(&mut slot, Some(&config)).unwrap();
        slot.unwrap()
    }

    #[test]
    fn test_gain() {
        let mut handle = bring_up();
        assert_eq!(handle.chan_get_gain(1).unwrap(), 0);
        handle.chan_set_gain(1, -6_000).unwrap();
        assert_eq!(handle.chan_get_gain(1).unwrap(), -6_000);
        assert!(matches!(
            handle.chan_set_gain(1, 20_000),
            Err(Error::OutOfRange { .. })
        ));
        assert_eq!(handle.chan_get_gain(1).unwrap(), -6_000);
    }

    #[test]
    fn test_mute() {
        let mut handle = bring_up();
        handle.chan_mute(3).unwrap();
        assert!(handle.chan_is_muted(3).unwrap());
        handle.chan_unmute(3).unwrap();
        assert!(!handle.chan_is_muted(3).unwrap());
    }

    #[test]
    fn test_route_checks_output() {
        let mut handle = bring_up();
        handle.route(0, 1).unwrap();
        assert!(matches!(handle.route(0, 2), Err(Error::OutOfRange { .. })));
    }
}
