//! Simulated watchdogs.
//!
//! Two variants are registered. `sim-wdt` models a multi-channel watchdog
//! where every channel must be fed within one period; its `isr` is the
//! period tick. `sim-wdt-basic` is a single-counter part with no per-channel
//! feed and no interrupt, so those operations report as unsupported.

use super::{device_id, release};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::wdt::{Watchdog, WdtCallback, WdtConfig, WdtHandle, WdtOps};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

#[derive(Debug)]
struct SimWdt {
    min_timeout_ms: u32,
    max_timeout_ms: u32,
    timeout_ms: u32,
    running: bool,
    // Bit per channel fed since the last tick.
    fed: u64,
    callback: Option<WdtCallback>,
    expirations: u32,
}

impl SimWdt {
    fn check_timeout(&self, timeout_ms: u32) -> Result<()> {
        if !(self.min_timeout_ms..=self.max_timeout_ms).contains(&timeout_ms) {
            return Err(Error::OutOfRange {
                what: "watchdog timeout",
                value: timeout_ms.into(),
                max: self.max_timeout_ms.into(),
            });
        }
        Ok(())
    }
}

fn all_fed(channels: u32) -> u64 {
    if channels >= 64 {
        u64::MAX
    } else {
        (1u64 << channels) - 1
    }
}

fn init(slot: &mut Option<WdtHandle>, config: &WdtConfig) -> Result<()> {
    let settings = &config.settings;
    if settings.channels == 0 || settings.channels > 64 {
        return Err(Error::Config(format!(
            "watchdog channels must be 1..=64, got {}",
            settings.channels
        )));
    }
    let wdt = SimWdt {
        min_timeout_ms: settings.min_timeout_ms,
        max_timeout_ms: settings.max_timeout_ms,
        timeout_ms: settings.default_timeout_ms,
        running: false,
        fed: 0,
        callback: None,
        expirations: 0,
    };
    wdt.check_timeout(settings.default_timeout_ms)
        .map_err(|e| Error::Config(format!("default timeout: {}", e)))?;

    let id = device_id(config.identifier)?;
    debug!(
        id,
        channels = settings.channels,
        timeout_ms = wdt.timeout_ms,
        "Simulated watchdog initialized"
    );
    *slot = Some(Handle::new(id, settings.channels, wdt));
    Ok(())
}

fn start(handle: &mut WdtHandle, timeout_ms: u32) -> Result<()> {
    let wdt = handle.state_mut::<SimWdt>()?;
    wdt.check_timeout(timeout_ms)?;
    wdt.timeout_ms = timeout_ms;
    wdt.running = true;
    wdt.fed = 0;
    info!(timeout_ms, "Watchdog started");
    Ok(())
}

fn stop(handle: &mut WdtHandle) -> Result<()> {
    handle.state_mut::<SimWdt>()?.running = false;
    info!("Watchdog stopped");
    Ok(())
}

fn feed(handle: &mut WdtHandle) -> Result<()> {
    let channels = handle.resource_count();
    let wdt = handle.state_mut::<SimWdt>()?;
    if !wdt.running {
        return Err(Error::NotReady("watchdog not running".into()));
    }
    wdt.fed = all_fed(channels);
    trace!("Watchdog fed");
    Ok(())
}

fn feed_chan(handle: &mut WdtHandle, chan: u32) -> Result<()> {
    handle.check_resource("watchdog channel", chan)?;
    let wdt = handle.state_mut::<SimWdt>()?;
    if !wdt.running {
        return Err(Error::NotReady("watchdog not running".into()));
    }
    wdt.fed |= 1 << chan;
    trace!(chan, "Watchdog channel fed");
    Ok(())
}

fn set_timeout(handle: &mut WdtHandle, timeout_ms: u32) -> Result<()> {
    let wdt = handle.state_mut::<SimWdt>()?;
    wdt.check_timeout(timeout_ms)?;
    wdt.timeout_ms = timeout_ms;
    debug!(timeout_ms, "Watchdog timeout set");
    Ok(())
}

fn get_timeout(handle: &mut WdtHandle) -> Result<u32> {
    Ok(handle.state::<SimWdt>()?.timeout_ms)
}

fn set_callback(handle: &mut WdtHandle, callback: WdtCallback) -> Result<()> {
    handle.state_mut::<SimWdt>()?.callback = Some(callback);
    Ok(())
}

fn isr(handle: &mut WdtHandle) {
    let id = handle.id();
    let channels = handle.resource_count();
    let Ok(wdt) = handle.state_mut::<SimWdt>() else {
        return;
    };
    if !wdt.running {
        return;
    }
    let starved = all_fed(channels) & !wdt.fed;
    wdt.fed = 0;
    if starved == 0 {
        return;
    }

    wdt.expirations += 1;
    warn!(id, starved, "Watchdog expired");
    if let Some(callback) = wdt.callback {
        callback(id);
    }
}

const FULL_OPS: WdtOps = WdtOps {
    init: Some(init),
    deinit: Some(release::<Watchdog>),
    start: Some(start),
    stop: Some(stop),
    feed: Some(feed),
    feed_chan: Some(feed_chan),
    set_timeout: Some(set_timeout),
    get_timeout: Some(get_timeout),
    set_callback: Some(set_callback),
    isr: Some(isr),
};

pub static SIM_WDT_OPS: WdtOps = FULL_OPS;

pub static SIM_WDT_BASIC_OPS: WdtOps = WdtOps {
    feed_chan: None,
    isr: None,
    ..FULL_OPS
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-wdt",
        description: "Multi-channel watchdog with expiry interrupt",
        table: BackendTable::Watchdog(&SIM_WDT_OPS),
    }
}

inventory::submit! {
    BackendDescriptor {
        name: "sim-wdt-basic",
        description: "Single-counter watchdog without channel feed or interrupt",
        table: BackendTable::Watchdog(&SIM_WDT_BASIC_OPS),
    }
}
