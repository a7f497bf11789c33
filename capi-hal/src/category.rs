//! Peripheral categories and their init-time configuration.
//!
//! Each category (clock, I2S, mixer, ...) is a zero-sized marker type
//! implementing [`Category`]. The marker ties together the category's
//! capability table type and the settings aggregate a board supplies at
//! `init`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use strum::{Display, EnumIter, EnumString};

use crate::error::Result;
use crate::handle::Handle;
use crate::registry::BackendTable;

/// Every peripheral category known to the dispatch layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Clock,
    I2s,
    Mixer,
    Decimator,
    PinCtrl,
    Watchdog,
    AudioFabric,
    AudioAdc,
    Spi,
}

/// Backend `init` slot: populate `slot` with a fresh handle.
pub type InitFn<C> = fn(&mut Option<Handle<C>>, &Config<C>) -> Result<()>;

/// Backend `deinit` slot. Receives the caller's handle slot so the backend
/// can release state and clear it.
pub type DeinitFn<C> = fn(&mut Option<Handle<C>>) -> Result<()>;

/// A peripheral category.
pub trait Category: Sized + 'static {
    /// Capability table a backend of this category supplies.
    type Ops: 'static;

    /// Category-specific configuration passed to `init`.
    type Settings: fmt::Debug + DeserializeOwned;

    const KIND: CategoryKind;

    fn init_slot(ops: &Self::Ops) -> Option<InitFn<Self>>;

    fn deinit_slot(ops: &Self::Ops) -> Option<DeinitFn<Self>>;

    /// Extract this category's table from a registered backend, if it is
    /// one of ours.
    fn from_table(table: &BackendTable) -> Option<&'static Self::Ops>;
}

/// Configuration for initializing one device of category `C`.
///
/// Borrowed for the duration of `init` only; backends copy whatever they
/// need to keep.
pub struct Config<C: Category> {
    /// Base address, bus number or other backend-defined device selector
    pub identifier: u64,
    /// Backend capability table
    pub ops: Option<&'static C::Ops>,
    /// Category settings
    pub settings: C::Settings,
    _category: PhantomData<fn() -> C>,
}

impl<C: Category> Config<C> {
    pub fn new(identifier: u64, ops: &'static C::Ops, settings: C::Settings) -> Self {
        Self {
            identifier,
            ops: Some(ops),
            settings,
            _category: PhantomData,
        }
    }
}

impl<C: Category> fmt::Debug for Config<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("category", &C::KIND)
            .field("identifier", &format_args!("{:#x}", self.identifier))
            .field("ops", &self.ops.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}
