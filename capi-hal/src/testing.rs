//! Spy backend helpers for unit tests.
//!
//! A spy handle owns a [`CallLog`] as its backend state. Spy slot functions
//! record a rendering of their arguments there, which lets tests assert both
//! what reached the backend and that nothing did.

use crate::category::Category;
use crate::error::Result;
use crate::handle::Handle;

#[derive(Debug, Default)]
pub struct CallLog {
    calls: Vec<String>,
}

/// Append `call` to the handle's call log.
pub fn record<C: Category>(handle: &mut Handle<C>, call: String) -> Result<()> {
    handle.state_mut::<CallLog>()?.calls.push(call);
    Ok(())
}

/// A handle with four resources, an empty call log and the given table.
pub fn spy_handle<C: Category>(ops: Option<&'static C::Ops>) -> Handle<C> {
    Handle::new(0, 4, CallLog::default()).with_ops(ops)
}

pub fn calls<C: Category>(handle: &Handle<C>) -> Vec<String> {
    handle
        .state::<CallLog>()
        .map(|log| log.calls.clone())
        .unwrap_or_default()
}
