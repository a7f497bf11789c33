//! Device handles.
//!
//! A [`Handle`] binds one capability table to one backend's private state.
//! Backends create handles in their `init` slot; the dispatch layer stamps
//! the table reference after `init` succeeds and never looks at the state.
//!
//! Handles are not synchronized. Operations take `&mut Handle`, so within
//! safe Rust a handle has a single user at a time. Code that must share a
//! handle between contexts (an interrupt-driven watchdog callback racing a
//! foreground `feed`, for example) opts in through [`Handle::into_shared`]
//! and serializes access itself.

use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::category::Category;
use crate::error::{Error, Result};

/// Handle shared between execution contexts behind an external lock.
pub type SharedHandle<C> = Arc<Mutex<Handle<C>>>;

/// Binding of a capability table to backend-private state.
pub struct Handle<C: Category> {
    id: u32,
    resource_count: u32,
    ops: Option<&'static C::Ops>,
    state: Box<dyn Any + Send>,
    _category: PhantomData<fn() -> C>,
}

impl<C: Category> Handle<C> {
    /// Create a handle owning `state`.
    ///
    /// `resource_count` is the number of channels, ports or pins the backend
    /// exposes. The table reference starts out empty and is filled in by the
    /// thin layer once `init` returns.
    pub fn new<S: Any + Send>(id: u32, resource_count: u32, state: S) -> Self {
        Self {
            id,
            resource_count,
            ops: None,
            state: Box::new(state),
            _category: PhantomData,
        }
    }

    /// Replace the table reference.
    pub fn with_ops(mut self, ops: Option<&'static C::Ops>) -> Self {
        self.ops = ops;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn resource_count(&self) -> u32 {
        self.resource_count
    }

    pub fn ops(&self) -> Option<&'static C::Ops> {
        self.ops
    }

    pub(crate) fn set_ops(&mut self, ops: Option<&'static C::Ops>) {
        self.ops = ops;
    }

    /// Borrow the backend state as `S`.
    ///
    /// Fails with [`Error::InvalidArgument`] when the handle was created by a
    /// backend with a different state type.
    pub fn state<S: Any>(&self) -> Result<&S> {
        self.state.downcast_ref::<S>().ok_or(Error::InvalidArgument)
    }

    pub fn state_mut<S: Any>(&mut self) -> Result<&mut S> {
        self.state.downcast_mut::<S>().ok_or(Error::InvalidArgument)
    }

    /// Validate a channel/port/pin index against the resource count.
    pub fn check_resource(&self, what: &'static str, index: u32) -> Result<()> {
        if index < self.resource_count {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                what,
                value: index.into(),
                max: i64::from(self.resource_count.saturating_sub(1)),
            })
        }
    }

    /// Move the handle behind a lock for use from more than one context.
    pub fn into_shared(self) -> SharedHandle<C> {
        Arc::new(Mutex::new(self))
    }
}

impl<C: Category> fmt::Debug for Handle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("category", &C::KIND)
            .field("id", &self.id)
            .field("resource_count", &self.resource_count)
            .field("ops", &self.ops.map(|_| type_name::<C::Ops>()))
            .finish_non_exhaustive()
    }
}
