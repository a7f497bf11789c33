//! Simulated decimation filter bank.

use super::{device_id, release, require_nonzero};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::decimator::{Decimator, DecimatorConfig, DecimatorHandle, DecimatorOps};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

#[derive(Debug, Clone, Copy)]
struct Channel {
    ratio: u32,
    enabled: bool,
}

#[derive(Debug)]
struct SimDecimator {
    ratios: Vec<u32>,
    channels: Vec<Channel>,
}

fn channel(handle: &mut DecimatorHandle, chan: u32) -> Result<&mut Channel> {
    handle.check_resource("decimator channel", chan)?;
    Ok(&mut handle.state_mut::<SimDecimator>()?.channels[chan as usize])
}

fn init(slot: &mut Option<DecimatorHandle>, config: &DecimatorConfig) -> Result<()> {
    let settings = &config.settings;
    let channels = require_nonzero("decimator channels", settings.channels)?;
    let mut ratios = settings.ratios.clone();
    ratios.sort_unstable();
    ratios.dedup();
    let Some(&lowest) = ratios.first() else {
        return Err(Error::Config("decimator needs at least one ratio".into()));
    };
    if lowest == 0 {
        return Err(Error::Config("decimation ratio 0 is meaningless".into()));
    }

    let decimator = SimDecimator {
        channels: vec![
            Channel {
                ratio: lowest,
                enabled: false,
            };
            channels as usize
        ],
        ratios,
    };
    let id = device_id(config.identifier)?;
    debug!(
        id,
        channels,
        ratios = ?decimator.ratios,
        "Simulated decimator initialized"
    );
    *slot = Some(Handle::new(id, channels, decimator));
    Ok(())
}

fn chan_set_ratio(handle: &mut DecimatorHandle, chan: u32, ratio: u32) -> Result<()> {
    handle.check_resource("decimator channel", chan)?;
    let decimator = handle.state_mut::<SimDecimator>()?;
    if decimator.ratios.binary_search(&ratio).is_err() {
        return Err(Error::OutOfRange {
            what: "decimation ratio",
            value: ratio.into(),
            max: decimator.ratios.last().copied().unwrap_or_default().into(),
        });
    }
    let channel = &mut decimator.channels[chan as usize];
    if channel.enabled {
        return Err(Error::Busy);
    }
    channel.ratio = ratio;
    trace!(chan, ratio, "Decimation ratio set");
    Ok(())
}

fn chan_get_ratio(handle: &mut DecimatorHandle, chan: u32) -> Result<u32> {
    Ok(channel(handle, chan)?.ratio)
}

fn chan_enable(handle: &mut DecimatorHandle, chan: u32) -> Result<()> {
    channel(handle, chan)?.enabled = true;
    Ok(())
}

fn chan_disable(handle: &mut DecimatorHandle, chan: u32) -> Result<()> {
    channel(handle, chan)?.enabled = false;
    Ok(())
}

pub static SIM_DECIMATOR_OPS: DecimatorOps = DecimatorOps {
    init: Some(init),
    deinit: Some(release::<Decimator>),
    chan_set_ratio: Some(chan_set_ratio),
    chan_get_ratio: Some(chan_get_ratio),
    chan_enable: Some(chan_enable),
    chan_disable: Some(chan_disable),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-decimator",
        description: "In-memory decimator with a fixed set of ratios",
        table: BackendTable::Decimator(&SIM_DECIMATOR_OPS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::decimator::{self, DecimatorSettings};
    use test_case::test_case;

    fn bring_up() -> DecimatorHandle {
        let config = DecimatorConfig::new(
            0,
            &SIM_DECIMATOR_OPS,
            DecimatorSettings {
                channels: 2,
                ratios: vec![128, 32, 64, 64],
            },
        );
        let mut slot = None;
        decimator::init(&mut slot, Some(&config)).unwrap();
        slot.unwrap()
    }

    #[test]
    fn test_reset_ratio_is_lowest() {
        let mut handle = bring_up();
        assert_eq!(handle.chan_get_ratio(0).unwrap(), 32);
    }

    #[test_case(32, true)]
    #[test_case(64, true)]
    #[test_case(128, true)]
    #[test_case(48, false)]
    #[test_case(256, false)]
    fn test_supported_ratios(ratio: u32, ok: bool) {
        let mut handle = bring_up();
        assert_eq!(handle.chan_set_ratio(1, ratio).is_ok(), ok);
    }

    #[test]
    fn test_ratio_locked_while_enabled() {
        let mut handle = bring_up();
        handle.chan_enable(0).unwrap();
        assert!(matches!(handle.chan_set_ratio(0, 64), Err(Error::Busy)));
        handle.chan_disable(0).unwrap();
        handle.chan_set_ratio(0, 64).unwrap();
        assert_eq!(handle.chan_get_ratio(0).unwrap(), 64);
    }

    #[test]
    fn test_empty_ratio_list_rejected() {
        let config = DecimatorConfig::new(
            0,
            &SIM_DECIMATOR_OPS,
            DecimatorSettings {
                channels: 2,
                ratios: vec![],
            },
        );
        let mut slot = None;
        assert!(matches!(
            decimator::init(&mut slot, Some(&config)),
            Err(Error::Config(_))
        ));
    }
}
