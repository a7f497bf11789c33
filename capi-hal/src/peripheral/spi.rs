//! SPI controller API.
//!
//! Device drivers talk to their chips through [`transceive`]; the SPI
//! backend underneath decides whether that is a hardware controller, a
//! bit-banged bus or a tunnel through some other transport.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// SPI modes (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

/// SPI controller settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiSettings {
    /// Bus clock (Hz)
    pub max_speed_hz: u32,
    #[serde(default)]
    pub mode: SpiMode,
    /// Number of chip selects
    pub chip_selects: u32,
}

capability_table! {
    category Spi(SpiSettings);

    /// Operations an SPI backend may supply.
    pub struct SpiOps {
        /// Full-duplex transfer with chip select `cs` asserted. Clocks
        /// `max(tx.len(), rx.len())` bytes; missing tx bytes are sent as
        /// 0xff and surplus rx bytes are discarded.
        fn transceive(cs: u32, tx: &[u8], rx: &mut [u8]) -> ();
        fn set_speed(hz: u32) -> ();
        fn set_mode(mode: SpiMode) -> ();
    }
}

pub type SpiHandle = Handle<Spi>;
pub type SpiConfig = Config<Spi>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::testing::{calls, record, spy_handle};

    // Echoes tx back into rx, inverted.
    fn spy_transceive(handle: &mut SpiHandle, cs: u32, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        record(handle, format!("transceive({}, {:02x?})", cs, tx))?;
        for (r, t) in rx.iter_mut().zip(tx) {
            *r = !t;
        }
        Ok(())
    }

    static SPY: SpiOps = SpiOps {
        transceive: Some(spy_transceive),
        ..SpiOps::EMPTY
    };

    #[test]
    fn test_transceive_forwards_buffers() {
        let mut handle = spy_handle::<Spi>(Some(&SPY));
        let mut rx = [0u8; 2];
        handle.transceive(1, &[0x0f, 0xf0], &mut rx).unwrap();
        assert_eq!(rx, [0xf0, 0x0f]);
        assert_eq!(calls(&handle), ["transceive(1, [0f, f0])"]);
    }

    #[test]
    fn test_guards_leave_rx_untouched() {
        let mut rx = [0xaau8; 2];
        assert!(transceive(None, 0, &[1, 2], &mut rx)
            .unwrap_err()
            .is_invalid_argument());

        let mut handle = spy_handle::<Spi>(None);
        assert!(transceive(Some(&mut handle), 0, &[1, 2], &mut rx)
            .unwrap_err()
            .is_invalid_argument());
        assert_eq!(rx, [0xaa, 0xaa]);

        let mut handle = spy_handle::<Spi>(Some(&SPY));
        assert!(handle.set_mode(SpiMode::Mode3).unwrap_err().is_invalid_argument());
        assert!(calls(&handle).is_empty());
    }
}
