//! Simulated pin multiplexer.

use super::{device_id, release, require_nonzero};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::pinctrl::{
    DriveStrength, PinCtrl, PinCtrlConfig, PinCtrlHandle, PinCtrlOps, Pull,
};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

#[derive(Debug, Default, Clone, Copy)]
struct Pin {
    function: u32,
    pull: Pull,
    strength: DriveStrength,
}

#[derive(Debug)]
struct SimPinCtrl {
    functions: u32,
    pins: Vec<Pin>,
}

fn pin(handle: &mut PinCtrlHandle, index: u32) -> Result<&mut Pin> {
    handle.check_resource("pin", index)?;
    Ok(&mut handle.state_mut::<SimPinCtrl>()?.pins[index as usize])
}

fn init(slot: &mut Option<PinCtrlHandle>, config: &PinCtrlConfig) -> Result<()> {
    let pins = require_nonzero("pins", config.settings.pins)?;
    let functions = require_nonzero("pin functions", config.settings.functions)?;
    let pinctrl = SimPinCtrl {
        functions,
        pins: vec![Pin::default(); pins as usize],
    };
    let id = device_id(config.identifier)?;
    debug!(id, pins, functions, "Simulated pin controller initialized");
    *slot = Some(Handle::new(id, pins, pinctrl));
    Ok(())
}

fn set_function(handle: &mut PinCtrlHandle, index: u32, func: u32) -> Result<()> {
    let functions = handle.state::<SimPinCtrl>()?.functions;
    if func >= functions {
        return Err(Error::OutOfRange {
            what: "pin function",
            value: func.into(),
            max: (functions - 1).into(),
        });
    }
    pin(handle, index)?.function = func;
    trace!(pin = index, func, "Pin function selected");
    Ok(())
}

fn get_function(handle: &mut PinCtrlHandle, index: u32) -> Result<u32> {
    Ok(pin(handle, index)?.function)
}

fn set_pull(handle: &mut PinCtrlHandle, index: u32, pull: Pull) -> Result<()> {
    pin(handle, index)?.pull = pull;
    trace!(pin = index, ?pull, "Pin pull set");
    Ok(())
}

fn set_drive_strength(
    handle: &mut PinCtrlHandle,
    index: u32,
    strength: DriveStrength,
) -> Result<()> {
    pin(handle, index)?.strength = strength;
    trace!(pin = index, ?strength, "Pin drive strength set");
    Ok(())
}

pub static SIM_PINCTRL_OPS: PinCtrlOps = PinCtrlOps {
    init: Some(init),
    deinit: Some(release::<PinCtrl>),
    set_function: Some(set_function),
    get_function: Some(get_function),
    set_pull: Some(set_pull),
    set_drive_strength: Some(set_drive_strength),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-pinctrl",
        description: "In-memory pin multiplexer with pull and drive settings",
        table: BackendTable::PinCtrl(&SIM_PINCTRL_OPS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::pinctrl::{self, PinCtrlSettings};

    fn bring_up() -> PinCtrlHandle {
        let config = PinCtrlConfig::new(
            0,
            &SIM_PINCTRL_OPS,
            PinCtrlSettings {
                pins: 16,
                functions: 4,
            },
        );
        let mut slot = None;
        pinctrl::init(&mut slot, Some(&config)).unwrap();
        slot.unwrap()
    }

    #[test]
    fn test_function_select() {
        let mut handle = bring_up();
        assert_eq!(handle.get_function(5).unwrap(), 0);
        handle.set_function(5, 3).unwrap();
        assert_eq!(handle.get_function(5).unwrap(), 3);
    }

    #[test]
    fn test_function_out_of_range() {
        let mut handle = bring_up();
        let err = handle.set_function(5, 4).unwrap_err();
        assert_eq!(err.code(), -34);
        assert_eq!(handle.get_function(5).unwrap(), 0);
    }

    #[test]
    fn test_pin_out_of_range() {
        let mut handle = bring_up();
        assert!(handle.set_pull(16, Pull::Up).is_err());
        assert!(handle.set_drive_strength(16, DriveStrength::High).is_err());
    }

    #[test]
    fn test_pad_settings_stored() {
        let mut handle = bring_up();
        handle.set_pull(2, Pull::Down).unwrap();
        handle.set_drive_strength(2, DriveStrength::Highest).unwrap();
        let pin = handle.state::<SimPinCtrl>().unwrap().pins[2];
        assert_eq!(pin.pull, Pull::Down);
        assert_eq!(pin.strength, DriveStrength::Highest);
    }
}
