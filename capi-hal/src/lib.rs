//! Capability-dispatch peripheral API.
//!
//! Each peripheral category (clock, I2S, mixer, decimator, pin control,
//! watchdog, audio fabric, audio ADC, SPI) has a capability table of
//! optional backend operations. Callers hold a [`Handle`] created by a
//! backend's `init` and call category operations on it; the dispatch layer
//! checks that the handle, its table and the requested slot exist, then
//! forwards the call unchanged.
//!
//! Backends register themselves by name in the [`Registry`], which is what
//! [`Board`] uses to bring up a board from its JSON description.

pub mod backend;
pub mod board;
pub mod category;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod peripheral;
pub mod registry;
pub mod tracing;

#[cfg(test)]
mod testing;

pub use board::{Board, DeviceInfo};
pub use category::{Category, CategoryKind, Config};
pub use config::{BoardConfig, DeviceConfig};
pub use error::{status, Error, Result};
pub use handle::{Handle, SharedHandle};
pub use registry::{BackendDescriptor, BackendTable, Registry};
