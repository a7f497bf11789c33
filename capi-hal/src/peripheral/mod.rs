//! Public API per peripheral category.
//!
//! Each module declares its category's capability table and settings, and
//! exposes one guarded function per operation (`wdt::feed_chan(handle, 3)`)
//! alongside the equivalent method on the category's handle
//! (`handle.feed_chan(3)`).

pub mod audioadc;
pub mod clk;
pub mod decimator;
pub mod fabric;
pub mod i2s;
pub mod mixer;
pub mod pinctrl;
pub mod spi;
pub mod wdt;
