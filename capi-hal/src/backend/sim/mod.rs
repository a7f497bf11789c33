//! Software models of each peripheral category.
//!
//! The simulated backends keep their register state in memory and enforce
//! the same kind of constraints real parts do (index ranges, supported
//! rates, busy resources). They back the inspection tool and the tests, and
//! are the starting point for writing a hardware backend.

pub mod audioadc;
pub mod clk;
pub mod decimator;
pub mod fabric;
pub mod i2s;
pub mod mixer;
pub mod pinctrl;
pub mod spi;
pub mod wdt;

use crate::category::Category;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::tracing::prelude::*;

/// Derive a handle id from a config identifier.
fn device_id(identifier: u64) -> Result<u32> {
    u32::try_from(identifier).map_err(|_| Error::OutOfRange {
        what: "identifier",
        value: i64::try_from(identifier).unwrap_or(i64::MAX),
        max: u32::MAX.into(),
    })
}

/// Reject a zero resource count from the board description.
fn require_nonzero(what: &'static str, count: u32) -> Result<u32> {
    if count == 0 {
        return Err(Error::Config(format!("{} must be at least 1", what)));
    }
    Ok(count)
}

/// Shared `deinit` slot: drop the backend state and clear the caller's slot.
fn release<C: Category>(slot: &mut Option<Handle<C>>) -> Result<()> {
    if let Some(handle) = slot.take() {
        debug!(category = %C::KIND, id = handle.id(), "Released simulated device");
    }
    Ok(())
}
