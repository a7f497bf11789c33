//! Simulated I2S controller.

use super::{device_id, release, require_nonzero};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::i2s::{
    Direction, I2s, I2sConfig, I2sFormat, I2sHandle, I2sOps, I2sPortConfig,
};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

#[derive(Debug, Default, Clone, Copy)]
struct Stream {
    config: Option<I2sPortConfig>,
    enabled: bool,
}

#[derive(Debug)]
struct SimI2s {
    mclk_hz: u32,
    // Indexed by port, then Rx/Tx.
    streams: Vec<[Stream; 2]>,
}

fn stream(handle: &mut I2sHandle, port: u32, dir: Direction) -> Result<&mut Stream> {
    handle.check_resource("i2s port", port)?;
    let i2s = handle.state_mut::<SimI2s>()?;
    let index = match dir {
        Direction::Rx => 0,
        Direction::Tx => 1,
    };
    Ok(&mut i2s.streams[port as usize][index])
}

/// Bit clock needed to carry `config`.
fn bclk_hz(config: &I2sPortConfig) -> u64 {
    let slots = match config.format {
        I2sFormat::Tdm { slots } => u64::from(slots),
        _ => 2,
    };
    u64::from(config.sample_rate_hz) * u64::from(config.word_bits) * slots
}

fn init(slot: &mut Option<I2sHandle>, config: &I2sConfig) -> Result<()> {
    let ports = require_nonzero("i2s ports", config.settings.ports)?;
    let i2s = SimI2s {
        mclk_hz: config.settings.mclk_hz,
        streams: vec![[Stream::default(); 2]; ports as usize],
    };
    let id = device_id(config.identifier)?;
    debug!(id, ports, mclk_hz = i2s.mclk_hz, "Simulated I2S initialized");
    *slot = Some(Handle::new(id, ports, i2s));
    Ok(())
}

fn port_config(
    handle: &mut I2sHandle,
    port: u32,
    dir: Direction,
    config: &I2sPortConfig,
) -> Result<()> {
    let mclk_hz = handle.state::<SimI2s>()?.mclk_hz;
    let needed = bclk_hz(config);
    if needed == 0 || needed > u64::from(mclk_hz) {
        return Err(Error::OutOfRange {
            what: "i2s bit clock",
            value: i64::try_from(needed).unwrap_or(i64::MAX),
            max: mclk_hz.into(),
        });
    }

    let stream = stream(handle, port, dir)?;
    if stream.enabled {
        return Err(Error::Busy);
    }
    stream.config = Some(*config);
    debug!(port, ?dir, bclk_hz = needed, "I2S stream configured");
    Ok(())
}

fn port_enable(handle: &mut I2sHandle, port: u32, dir: Direction) -> Result<()> {
    let stream = stream(handle, port, dir)?;
    if stream.config.is_none() {
        return Err(Error::NotReady(format!("i2s port {} {:?} not configured", port, dir)));
    }
    stream.enabled = true;
    trace!(port, ?dir, "I2S stream enabled");
    Ok(())
}

fn port_disable(handle: &mut I2sHandle, port: u32, dir: Direction) -> Result<()> {
    stream(handle, port, dir)?.enabled = false;
    trace!(port, ?dir, "I2S stream disabled");
    Ok(())
}

fn port_is_enabled(handle: &mut I2sHandle, port: u32, dir: Direction) -> Result<bool> {
    Ok(stream(handle, port, dir)?.enabled)
}

pub static SIM_I2S_OPS: I2sOps = I2sOps {
    init: Some(init),
    deinit: Some(release::<I2s>),
    port_config: Some(port_config),
    port_enable: Some(port_enable),
    port_disable: Some(port_disable),
    port_is_enabled: Some(port_is_enabled),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-i2s",
        description: "In-memory I2S controller with per-direction streams",
        table: BackendTable::I2s(&SIM_I2S_OPS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::i2s::{self, I2sSettings};

    fn bring_up() -> I2sHandle {
        let config = I2sConfig::new(
            1,
            &SIM_I2S_OPS,
            I2sSettings {
                ports: 3,
                mclk_hz: 24_576_000,
            },
        );
        let mut slot = None;
        i2s::init(&mut slot, Some(&config)).unwrap();
        slot.unwrap()
    }

    fn stereo_48k() -> I2sPortConfig {
        I2sPortConfig {
            sample_rate_hz: 48_000,
            word_bits: 32,
            format: I2sFormat::Standard,
            master: true,
        }
    }

    #[test]
    fn test_enable_configured_port() {
        let mut handle = bring_up();
        handle.port_config(2, Direction::Tx, &stereo_48k()).unwrap();
        i2s::port_enable(Some(&mut handle), 2, Direction::Tx).unwrap();
        assert!(handle.port_is_enabled(2, Direction::Tx).unwrap());
        assert!(!handle.port_is_enabled(2, Direction::Rx).unwrap());
    }

    #[test]
    fn test_enable_unconfigured_port() {
        let mut handle = bring_up();
        let err = handle.port_enable(0, Direction::Rx).unwrap_err();
        assert!(matches!(err, Error::NotReady(_)), "got {:?}", err);
        assert!(!err.is_invalid_argument());
        assert_eq!(err.code(), -11);
    }

    #[test]
    fn test_reconfigure_while_enabled_is_busy() {
        let mut handle = bring_up();
        handle.port_config(0, Direction::Rx, &stereo_48k()).unwrap();
        handle.port_enable(0, Direction::Rx).unwrap();
        assert!(matches!(
            handle.port_config(0, Direction::Rx, &stereo_48k()),
            Err(Error::Busy)
        ));
        handle.port_disable(0, Direction::Rx).unwrap();
        handle.port_config(0, Direction::Rx, &stereo_48k()).unwrap();
    }

    #[test]
    fn test_bit_clock_limit() {
        let mut handle = bring_up();
        // 16 slots * 32 bits * 96 kHz = 49.152 MHz > 24.576 MHz MCLK
        let config = I2sPortConfig {
            sample_rate_hz: 96_000,
            word_bits: 32,
            format: I2sFormat::Tdm { slots: 16 },
            master: true,
        };
        assert!(matches!(
            handle.port_config(1, Direction::Tx, &config),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_port_out_of_range() {
        let mut handle = bring_up();
        assert!(matches!(
            handle.port_enable(3, Direction::Tx),
            Err(Error::OutOfRange { .. })
        ));
    }
}
