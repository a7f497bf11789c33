//! Guarded forwarding from the public API to backend capability tables.
//!
//! Every public operation runs the same three checks before calling into a
//! backend:
//!
//! 1. the caller passed a handle,
//! 2. the handle carries a capability table,
//! 3. the table populates the slot for this operation.
//!
//! Any failed check yields [`Error::InvalidArgument`] and nothing else
//! happens. Otherwise the backend function receives the handle and the
//! caller's arguments unchanged, and its result is returned unchanged. This
//! layer does not log, lock or retry.
//!
//! Category modules declare their tables with [`capability_table!`], which
//! generates the table struct, one guarded free function per slot and the
//! matching inherent methods on `Handle<Category>`.

use crate::category::{Category, Config};
use crate::error::{Error, Result};
use crate::handle::Handle;

/// Resolve `slot` on `handle`'s table, applying the three guards.
pub fn resolve<'h, C, F>(
    handle: Option<&'h mut Handle<C>>,
    slot: impl FnOnce(&'static C::Ops) -> Option<F>,
) -> Result<(&'h mut Handle<C>, F)>
where
    C: Category,
    F: Copy,
{
    let handle = handle.ok_or(Error::InvalidArgument)?;
    let ops = handle.ops().ok_or(Error::InvalidArgument)?;
    let op = slot(ops).ok_or(Error::InvalidArgument)?;
    Ok((handle, op))
}

/// Like [`resolve`], for operations with no status to report. An unsatisfied
/// guard resolves to `None` and the caller does nothing.
pub fn resolve_void<'h, C, F>(
    handle: Option<&'h mut Handle<C>>,
    slot: impl FnOnce(&'static C::Ops) -> Option<F>,
) -> Option<(&'h mut Handle<C>, F)>
where
    C: Category,
    F: Copy,
{
    resolve(handle, slot).ok()
}

/// Create a handle through the backend named by `config.ops`.
///
/// A missing config, table or `init` slot fails with
/// [`Error::InvalidArgument`] and leaves `slot` untouched. On success the
/// new handle's table reference is set from the config.
pub fn init<C: Category>(slot: &mut Option<Handle<C>>, config: Option<&Config<C>>) -> Result<()> {
    let config = config.ok_or(Error::InvalidArgument)?;
    let ops = config.ops.ok_or(Error::InvalidArgument)?;
    let init = C::init_slot(ops).ok_or(Error::InvalidArgument)?;

    init(slot, config)?;

    if let Some(handle) = slot.as_mut() {
        handle.set_ops(Some(ops));
    }
    Ok(())
}

/// Destroy the handle in `slot` through its backend.
///
/// The backend receives the slot itself and normally clears it, so a second
/// call on the same slot fails the first guard.
pub fn deinit<C: Category>(slot: &mut Option<Handle<C>>) -> Result<()> {
    let handle = slot.as_ref().ok_or(Error::InvalidArgument)?;
    let ops = handle.ops().ok_or(Error::InvalidArgument)?;
    let deinit = C::deinit_slot(ops).ok_or(Error::InvalidArgument)?;
    deinit(slot)
}

/// Declare a peripheral category: marker type, capability table, guarded
/// wrappers and handle methods.
///
/// ```ignore
/// capability_table! {
///     category Watchdog(WdtSettings);
///
///     /// Operations a watchdog backend may supply.
///     pub struct WdtOps {
///         /// Restart the countdown.
///         fn feed() -> ();
///     }
///
///     void {
///         /// Service the expiry interrupt.
///         fn isr();
///     }
/// }
/// ```
macro_rules! capability_table {
    (
        category $cat:ident($settings:ty);

        $(#[$ops_meta:meta])*
        pub struct $ops:ident {
            $(
                $(#[$op_meta:meta])*
                fn $op:ident($($arg:ident : $ty:ty),* $(,)?) -> $ret:ty;
            )*
        }

        $(
            void {
                $(
                    $(#[$vop_meta:meta])*
                    fn $vop:ident($($varg:ident : $vty:ty),* $(,)?);
                )*
            }
        )?
    ) => {
        #[doc = concat!("Marker type for the `", stringify!($cat), "` category.")]
        #[derive(Debug, Clone, Copy)]
        pub enum $cat {}

        $(#[$ops_meta])*
        #[derive(Clone, Copy)]
        pub struct $ops {
            pub init: Option<$crate::category::InitFn<$cat>>,
            pub deinit: Option<$crate::category::DeinitFn<$cat>>,
            $(
                $(#[$op_meta])*
                pub $op: Option<
                    fn(&mut $crate::handle::Handle<$cat> $(, $ty)*) -> $crate::error::Result<$ret>,
                >,
            )*
            $($(
                $(#[$vop_meta])*
                pub $vop: Option<fn(&mut $crate::handle::Handle<$cat> $(, $vty)*)>,
            )*)?
        }

        impl $ops {
            /// Table with every slot empty; start backend tables from this.
            pub const EMPTY: Self = Self {
                init: None,
                deinit: None,
                $($op: None,)*
                $($($vop: None,)*)?
            };

            /// Names of the populated slots, in declaration order.
            pub fn supported(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                if self.init.is_some() {
                    names.push("init");
                }
                if self.deinit.is_some() {
                    names.push("deinit");
                }
                $(
                    if self.$op.is_some() {
                        names.push(stringify!($op));
                    }
                )*
                $($(
                    if self.$vop.is_some() {
                        names.push(stringify!($vop));
                    }
                )*)?
                names
            }
        }

        impl $crate::category::Category for $cat {
            type Ops = $ops;
            type Settings = $settings;

            const KIND: $crate::category::CategoryKind = $crate::category::CategoryKind::$cat;

            fn init_slot(ops: &$ops) -> Option<$crate::category::InitFn<$cat>> {
                ops.init
            }

            fn deinit_slot(ops: &$ops) -> Option<$crate::category::DeinitFn<$cat>> {
                ops.deinit
            }

            fn from_table(table: &$crate::registry::BackendTable) -> Option<&'static $ops> {
                match table {
                    $crate::registry::BackendTable::$cat(ops) => Some(*ops),
                    _ => None,
                }
            }
        }

        /// Create a handle in `slot` from `config`.
        pub fn init(
            slot: &mut Option<$crate::handle::Handle<$cat>>,
            config: Option<&$crate::category::Config<$cat>>,
        ) -> $crate::error::Result<()> {
            $crate::dispatch::init(slot, config)
        }

        /// Destroy the handle in `slot`.
        pub fn deinit(
            slot: &mut Option<$crate::handle::Handle<$cat>>,
        ) -> $crate::error::Result<()> {
            $crate::dispatch::deinit(slot)
        }

        $(
            $(#[$op_meta])*
            pub fn $op(
                handle: Option<&mut $crate::handle::Handle<$cat>>
                $(, $arg: $ty)*
            ) -> $crate::error::Result<$ret> {
                let (handle, op) =
                    $crate::dispatch::resolve(handle, |ops: &'static $ops| ops.$op)?;
                op(handle $(, $arg)*)
            }
        )*

        $($(
            $(#[$vop_meta])*
            pub fn $vop(handle: Option<&mut $crate::handle::Handle<$cat>> $(, $varg: $vty)*) {
                if let Some((handle, op)) =
                    $crate::dispatch::resolve_void(handle, |ops: &'static $ops| ops.$vop)
                {
                    op(handle $(, $varg)*);
                }
            }
        )*)?

        impl $crate::handle::Handle<$cat> {
            $(
                $(#[$op_meta])*
                pub fn $op(&mut self $(, $arg: $ty)*) -> $crate::error::Result<$ret> {
                    $op(Some(self) $(, $arg)*)
                }
            )*
            $($(
                $(#[$vop_meta])*
                pub fn $vop(&mut self $(, $varg: $vty)*) {
                    $vop(Some(self) $(, $varg)*)
                }
            )*)?
        }
    };
}

pub(crate) use capability_table;
