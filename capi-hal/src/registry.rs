//! Backend registration.
//!
//! Backends announce themselves with `inventory::submit!` and a
//! [`BackendDescriptor`]. The descriptor holds the backend's static
//! capability table wrapped in [`BackendTable`], a closed enum with one
//! variant per category, so lookups stay typed without any runtime plugin
//! machinery.

use crate::category::{Category, CategoryKind};
use crate::peripheral::{
    audioadc::AudioAdcOps, clk::ClkOps, decimator::DecimatorOps, fabric::FabricOps,
    i2s::I2sOps, mixer::MixerOps, pinctrl::PinCtrlOps, spi::SpiOps, wdt::WdtOps,
};
use crate::tracing::prelude::*;

/// A backend's capability table, tagged by category.
#[derive(Clone, Copy)]
pub enum BackendTable {
    Clock(&'static ClkOps),
    I2s(&'static I2sOps),
    Mixer(&'static MixerOps),
    Decimator(&'static DecimatorOps),
    PinCtrl(&'static PinCtrlOps),
    Watchdog(&'static WdtOps),
    AudioFabric(&'static FabricOps),
    AudioAdc(&'static AudioAdcOps),
    Spi(&'static SpiOps),
}

impl BackendTable {
    pub fn kind(&self) -> CategoryKind {
        match self {
            BackendTable::Clock(_) => CategoryKind::Clock,
            BackendTable::I2s(_) => CategoryKind::I2s,
            BackendTable::Mixer(_) => CategoryKind::Mixer,
            BackendTable::Decimator(_) => CategoryKind::Decimator,
            BackendTable::PinCtrl(_) => CategoryKind::PinCtrl,
            BackendTable::Watchdog(_) => CategoryKind::Watchdog,
            BackendTable::AudioFabric(_) => CategoryKind::AudioFabric,
            BackendTable::AudioAdc(_) => CategoryKind::AudioAdc,
            BackendTable::Spi(_) => CategoryKind::Spi,
        }
    }

    /// Names of the operations this backend populates.
    pub fn supported(&self) -> Vec<&'static str> {
        match self {
            BackendTable::Clock(ops) => ops.supported(),
            BackendTable::I2s(ops) => ops.supported(),
            BackendTable::Mixer(ops) => ops.supported(),
            BackendTable::Decimator(ops) => ops.supported(),
            BackendTable::PinCtrl(ops) => ops.supported(),
            BackendTable::Watchdog(ops) => ops.supported(),
            BackendTable::AudioFabric(ops) => ops.supported(),
            BackendTable::AudioAdc(ops) => ops.supported(),
            BackendTable::Spi(ops) => ops.supported(),
        }
    }
}

/// Static description of one backend.
pub struct BackendDescriptor {
    /// Unique backend name, referenced from board descriptions
    pub name: &'static str,
    /// One-line human readable description
    pub description: &'static str,
    pub table: BackendTable,
}

inventory::collect!(BackendDescriptor);

/// Registry that uses inventory to find registered backends.
pub struct Registry;

impl Registry {
    /// All registered backends, sorted by category then name.
    pub fn backends(&self) -> Vec<&'static BackendDescriptor> {
        let mut all: Vec<_> = inventory::iter::<BackendDescriptor>().collect();
        all.sort_by_key(|desc| (desc.table.kind() as u8, desc.name));
        all
    }

    /// Backends implementing `kind`.
    pub fn for_kind(&self, kind: CategoryKind) -> impl Iterator<Item = &'static BackendDescriptor> {
        inventory::iter::<BackendDescriptor>().filter(move |desc| desc.table.kind() == kind)
    }

    /// Look up a backend by name.
    pub fn lookup(&self, name: &str) -> Option<&'static BackendDescriptor> {
        inventory::iter::<BackendDescriptor>().find(|desc| desc.name == name)
    }

    /// Look up the capability table of backend `name` for category `C`.
    ///
    /// Returns None if no backend has that name, or if the backend belongs
    /// to a different category.
    pub fn find<C: Category>(&self, name: &str) -> Option<&'static C::Ops> {
        let desc = self.lookup(name)?;
        let ops = C::from_table(&desc.table);
        if ops.is_none() {
            warn!(
                backend = name,
                expected = %C::KIND,
                actual = %desc.table.kind(),
                "Backend registered under a different category"
            );
        }
        ops
    }
}
