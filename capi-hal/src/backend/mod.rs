//! Concrete backends.
//!
//! Backends populate a category's capability table, own their private
//! state, and register the table with `inventory::submit!` so boards can
//! refer to them by name.

pub mod sim;
