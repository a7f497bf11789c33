//! Board bring-up and shutdown.
//!
//! A [`Board`] owns one handle per device in a [`BoardConfig`]. Bring-up
//! resolves every device's backend through the [`Registry`], decodes its
//! settings for the device's category and runs the guarded `init`. Devices
//! are shut down in reverse order of bring-up.

use std::any::Any;

use crate::category::{Category, CategoryKind, Config};
use crate::config::{BoardConfig, DeviceConfig};
use crate::dispatch;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::{
    audioadc::AudioAdc, clk::Clock, decimator::Decimator, fabric::AudioFabric, i2s::I2s,
    mixer::Mixer, pinctrl::PinCtrl, spi::Spi, wdt::Watchdog,
};
use crate::registry::{BackendDescriptor, Registry};
use crate::tracing::prelude::*;

/// Type-erased handle slot, so one board can hold every category.
trait DeviceSlot {
    fn deinit(&mut self) -> Result<()>;
    fn handle_id(&self) -> Option<u32>;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Category> DeviceSlot for Option<Handle<C>> {
    fn deinit(&mut self) -> Result<()> {
        dispatch::deinit(self)
    }

    fn handle_id(&self) -> Option<u32> {
        self.as_ref().map(Handle::id)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Device {
    name: String,
    kind: CategoryKind,
    backend: &'static BackendDescriptor,
    slot: Box<dyn DeviceSlot>,
}

/// Summary of one live device.
#[derive(Debug, Clone)]
pub struct DeviceInfo<'a> {
    pub name: &'a str,
    pub kind: CategoryKind,
    pub backend: &'static str,
    pub id: Option<u32>,
    /// Operations the backend populates
    pub supported: Vec<&'static str>,
}

/// A brought-up board.
pub struct Board {
    name: String,
    devices: Vec<Device>,
}

fn open<C: Category>(
    registry: &Registry,
    device: &DeviceConfig,
) -> Result<(&'static BackendDescriptor, Box<dyn DeviceSlot>)> {
    let backend = registry
        .lookup(&device.backend)
        .ok_or_else(|| Error::NoDevice(format!("no backend named {:?}", device.backend)))?;
    let ops = registry.find::<C>(&device.backend).ok_or_else(|| {
        Error::Config(format!(
            "backend {} drives {} devices, not {}",
            backend.name,
            backend.table.kind(),
            C::KIND
        ))
    })?;
    let settings: C::Settings = serde_json::from_value(device.settings.clone())?;
    trace!(device = %device.name, ?settings, "Decoded device settings");

    let config = Config::<C>::new(device.identifier, ops, settings);
    let mut slot: Option<Handle<C>> = None;
    dispatch::init(&mut slot, Some(&config))?;
    if slot.is_none() {
        return Err(Error::NoDevice(format!(
            "backend {} created no handle for {}",
            backend.name, device.name
        )));
    }
    let slot: Box<dyn DeviceSlot> = Box::new(slot);
    Ok((backend, slot))
}

fn open_device(
    registry: &Registry,
    device: &DeviceConfig,
) -> Result<(&'static BackendDescriptor, Box<dyn DeviceSlot>)> {
    match device.category {
        CategoryKind::Clock => open::<Clock>(registry, device),
        CategoryKind::I2s => open::<I2s>(registry, device),
        CategoryKind::Mixer => open::<Mixer>(registry, device),
        CategoryKind::Decimator => open::<Decimator>(registry, device),
        CategoryKind::PinCtrl => open::<PinCtrl>(registry, device),
        CategoryKind::Watchdog => open::<Watchdog>(registry, device),
        CategoryKind::AudioFabric => open::<AudioFabric>(registry, device),
        CategoryKind::AudioAdc => open::<AudioAdc>(registry, device),
        CategoryKind::Spi => open::<Spi>(registry, device),
    }
}

impl Board {
    /// Bring up every device in `config`.
    ///
    /// On the first failure, devices already brought up are shut down again
    /// and the error is returned.
    pub fn bring_up(config: &BoardConfig) -> Result<Self> {
        let registry = Registry;
        let mut board = Board {
            name: config.name.clone(),
            devices: Vec::with_capacity(config.devices.len()),
        };

        info!(board = %config.name, devices = config.devices.len(), "Bringing up board");
        for device in &config.devices {
            match open_device(&registry, device) {
                Ok((backend, slot)) => {
                    debug!(
                        board = %config.name,
                        device = %device.name,
                        category = %device.category,
                        backend = backend.name,
                        id = ?slot.handle_id(),
                        "Device initialized"
                    );
                    board.devices.push(Device {
                        name: device.name.clone(),
                        kind: device.category,
                        backend,
                        slot,
                    });
                }
                Err(e) => {
                    error!(
                        board = %config.name,
                        device = %device.name,
                        backend = %device.backend,
                        error = %e,
                        "Device initialization failed"
                    );
                    // Bring-up already failed; shutdown errors are only logged.
                    let _ = board.shutdown();
                    return Err(e);
                }
            }
        }
        info!(board = %config.name, "Board up");
        Ok(board)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn devices(&self) -> impl Iterator<Item = DeviceInfo<'_>> {
        self.devices.iter().map(|device| DeviceInfo {
            name: &device.name,
            kind: device.kind,
            backend: device.backend.name,
            id: device.slot.handle_id(),
            supported: device.backend.table.supported(),
        })
    }

    /// Borrow the handle of device `name`.
    ///
    /// Returns None if there is no such device, if it belongs to another
    /// category, or if it has been shut down.
    pub fn handle<C: Category>(&mut self, name: &str) -> Option<&mut Handle<C>> {
        self.devices
            .iter_mut()
            .find(|device| device.name == name)?
            .slot
            .as_any_mut()
            .downcast_mut::<Option<Handle<C>>>()?
            .as_mut()
    }

    /// Deinitialize every device in reverse bring-up order.
    ///
    /// Every device is attempted. Failures are logged and the first one is
    /// returned.
    pub fn shutdown(&mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(mut device) = self.devices.pop() {
            match device.slot.deinit() {
                Ok(()) => {
                    debug!(board = %self.name, device = %device.name, "Device shut down");
                }
                Err(e) => {
                    warn!(
                        board = %self.name,
                        device = %device.name,
                        backend = device.backend.name,
                        error = %e,
                        "Device shutdown failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }
        info!(board = %self.name, "Board shut down");
        first_error.map_or(Ok(()), Err)
    }
}
