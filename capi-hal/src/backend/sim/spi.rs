//! Loopback SPI controller.
//!
//! MOSI is wired to MISO, so every byte clocked out is read back. When the
//! receive buffer is longer than the transmit buffer the controller clocks
//! out idle `0xff` bytes, which is what comes back.

use super::{device_id, release, require_nonzero};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::spi::{Spi, SpiConfig, SpiHandle, SpiMode, SpiOps};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

const IDLE_BYTE: u8 = 0xff;

#[derive(Debug)]
struct SimSpi {
    max_speed_hz: u32,
    speed_hz: u32,
    mode: SpiMode,
    bytes_transferred: u64,
}

fn init(slot: &mut Option<SpiHandle>, config: &SpiConfig) -> Result<()> {
    let settings = &config.settings;
    let chip_selects = require_nonzero("spi chip selects", settings.chip_selects)?;
    let max_speed_hz = require_nonzero("spi max speed", settings.max_speed_hz)?;
    let spi = SimSpi {
        max_speed_hz,
        speed_hz: max_speed_hz,
        mode: settings.mode,
        bytes_transferred: 0,
    };
    let id = device_id(config.identifier)?;
    debug!(
        id,
        chip_selects,
        max_speed_hz,
        mode = ?spi.mode,
        "Simulated SPI loopback initialized"
    );
    *slot = Some(Handle::new(id, chip_selects, spi));
    Ok(())
}

fn transceive(handle: &mut SpiHandle, cs: u32, tx: &[u8], rx: &mut [u8]) -> Result<()> {
    handle.check_resource("spi chip select", cs)?;
    let spi = handle.state_mut::<SimSpi>()?;
    for (i, byte) in rx.iter_mut().enumerate() {
        *byte = tx.get(i).copied().unwrap_or(IDLE_BYTE);
    }
    let clocked = tx.len().max(rx.len());
    spi.bytes_transferred += clocked as u64;
    trace!(cs, tx = ?tx, clocked, "SPI transfer");
    Ok(())
}

fn set_speed(handle: &mut SpiHandle, hz: u32) -> Result<()> {
    let spi = handle.state_mut::<SimSpi>()?;
    if hz == 0 || hz > spi.max_speed_hz {
        return Err(Error::OutOfRange {
            what: "spi speed",
            value: hz.into(),
            max: spi.max_speed_hz.into(),
        });
    }
    spi.speed_hz = hz;
    debug!(hz, "SPI speed set");
    Ok(())
}

fn set_mode(handle: &mut SpiHandle, mode: SpiMode) -> Result<()> {
    handle.state_mut::<SimSpi>()?.mode = mode;
    debug!(?mode, "SPI mode set");
    Ok(())
}

pub static SIM_SPI_LOOPBACK_OPS: SpiOps = SpiOps {
    init: Some(init),
    deinit: Some(release::<Spi>),
    transceive: Some(transceive),
    set_speed: Some(set_speed),
    set_mode: Some(set_mode),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-spi-loopback",
        description: "SPI controller with MOSI looped back to MISO",
        table: BackendTable::Spi(&SIM_SPI_LOOPBACK_OPS),
    }
}
