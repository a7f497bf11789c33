//! Audio fabric (stream routing) API.
//!
//! An audio fabric connects stream sources (ADCs, I2S receivers, DMA
//! readers) to sinks (DACs, I2S transmitters, DMA writers). Sources and
//! sinks are numbered independently.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// Audio fabric settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FabricSettings {
    pub sources: u32,
    pub sinks: u32,
    /// Fabric-wide sample rates the backend can run at (Hz)
    pub sample_rates: Vec<u32>,
}

capability_table! {
    category AudioFabric(FabricSettings);

    /// Operations an audio fabric backend may supply.
    pub struct FabricOps {
        fn connect(source: u32, sink: u32) -> ();
        fn disconnect(source: u32, sink: u32) -> ();
        fn is_connected(source: u32, sink: u32) -> bool;
        fn set_sample_rate(hz: u32) -> ();
    }
}

pub type FabricHandle = Handle<AudioFabric>;
pub type FabricConfig = Config<AudioFabric>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::testing::{calls, record, spy_handle};
    use test_case::test_case;

    fn spy_is_connected(handle: &mut FabricHandle, source: u32, sink: u32) -> Result<bool> {
        record(handle, format!("is_connected({}, {})", source, sink))?;
        Ok(source == sink)
    }

    static SPY: FabricOps = FabricOps {
        is_connected: Some(spy_is_connected),
        ..FabricOps::EMPTY
    };

    #[test]
    fn test_null_handle() {
        assert!(connect(None, 0, 0).unwrap_err().is_invalid_argument());
        assert!(is_connected(None, 0, 0).unwrap_err().is_invalid_argument());
    }

    #[test_case(None; "null table")]
    #[test_case(Some(&SPY); "null slot")]
    fn test_unsatisfied_connect(ops: Option<&'static FabricOps>) {
        let mut handle = spy_handle::<AudioFabric>(ops);
        assert!(handle.connect(0, 0).unwrap_err().is_invalid_argument());
        assert!(set_sample_rate(Some(&mut handle), 48_000)
            .unwrap_err()
            .is_invalid_argument());
        assert!(calls(&handle).is_empty());
    }

    #[test]
    fn test_null_table_hides_every_operation() {
        let mut handle = spy_handle::<AudioFabric>(None);
        assert!(handle.is_connected(1, 1).unwrap_err().is_invalid_argument());
        assert!(handle.disconnect(1, 1).unwrap_err().is_invalid_argument());
        assert!(calls(&handle).is_empty());
    }

    #[test]
    fn test_result_returned_unchanged() {
        let mut handle = spy_handle::<AudioFabric>(Some(&SPY));
        assert!(is_connected(Some(&mut handle), 1, 1).unwrap());
        assert!(!handle.is_connected(1, 2).unwrap());
        assert_eq!(calls(&handle), ["is_connected(1, 1)", "is_connected(1, 2)"]);
    }
}
