//! Decimation filter API.

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::handle::Handle;

/// Decimator settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecimatorSettings {
    pub channels: u32,
    /// Decimation ratios the hardware can run at
    pub ratios: Vec<u32>,
}

capability_table! {
    category Decimator(DecimatorSettings);

    /// Operations a decimator backend may supply.
    pub struct DecimatorOps {
        fn chan_set_ratio(chan: u32, ratio: u32) -> ();
        fn chan_get_ratio(chan: u32) -> u32;
        fn chan_enable(chan: u32) -> ();
        fn chan_disable(chan: u32) -> ();
    }
}

pub type DecimatorHandle = Handle<Decimator>;
pub type DecimatorConfig = Config<Decimator>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::testing::{calls, record, spy_handle};
    use test_case::test_case;

    fn spy_set_ratio(handle: &mut DecimatorHandle, chan: u32, ratio: u32) -> Result<()> {
        record(handle, format!("chan_set_ratio({}, {})", chan, ratio))
    }

    static SPY: DecimatorOps = DecimatorOps {
        chan_set_ratio: Some(spy_set_ratio),
        ..DecimatorOps::EMPTY
    };

    #[test_case(None; "null table")]
    #[test_case(Some(&SPY); "null slot")]
    fn test_unsatisfied_enable(ops: Option<&'static DecimatorOps>) {
        let mut handle = spy_handle::<Decimator>(ops);
        assert!(chan_enable(Some(&mut handle), 0)
            .unwrap_err()
            .is_invalid_argument());
        assert!(calls(&handle).is_empty());
    }

    #[test]
    fn test_null_handle() {
        assert!(chan_get_ratio(None, 0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_set_ratio_forwards() {
        let mut handle = spy_handle::<Decimator>(Some(&SPY));
        handle.chan_set_ratio(1, 64).unwrap();
        assert_eq!(calls(&handle), ["chan_set_ratio(1, 64)"]);
    }
}
