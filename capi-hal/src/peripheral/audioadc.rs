//! Audio ADC API.
//!
//! An audio ADC is a multi-channel converter made of an analog and a digital
//! hardware domain. Channels are grouped in pairs (channel `n` belongs to
//! pair `n / 2`); sample rate, word size, interface protocol and filter
//! latency are configured per pair, while muting, mic bias, gain and the
//! high-pass filter are per channel.
//!
//! Backends may additionally support automatic level control (ALC) and a
//! wind noise filter (WNF); the board declares which in [`AudioAdcSettings`].

use serde::{Deserialize, Serialize};

use crate::category::Config;
use crate::dispatch::capability_table;
use crate::error::{Error, Result};
use crate::handle::Handle;

/// Main clock frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MclkFreq {
    F4096K,
    F5644K,
    F6144K,
    F8192K,
    F11289K,
    F12288K,
    F16384K,
    F16934K,
    F18432K,
    F22579K,
    F24576K,
    F33868K,
}

impl MclkFreq {
    pub fn hz(self) -> u32 {
        match self {
            MclkFreq::F4096K => 4_096_000,
            MclkFreq::F5644K => 5_644_800,
            MclkFreq::F6144K => 6_144_000,
            MclkFreq::F8192K => 8_192_000,
            MclkFreq::F11289K => 11_289_600,
            MclkFreq::F12288K => 12_288_000,
            MclkFreq::F16384K => 16_384_000,
            MclkFreq::F16934K => 16_934_400,
            MclkFreq::F18432K => 18_432_000,
            MclkFreq::F22579K => 22_579_200,
            MclkFreq::F24576K => 24_576_000,
            MclkFreq::F33868K => 33_868_800,
        }
    }
}

/// Sampling rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRate {
    Fs8000,
    Fs11025,
    Fs12000,
    Fs16000,
    Fs22050,
    Fs24000,
    Fs32000,
    Fs44100,
    Fs48000,
    Fs96000,
    Fs192000,
    Fs384000,
    Fs768000,
}

impl SampleRate {
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Fs8000 => 8_000,
            SampleRate::Fs11025 => 11_025,
            SampleRate::Fs12000 => 12_000,
            SampleRate::Fs16000 => 16_000,
            SampleRate::Fs22050 => 22_050,
            SampleRate::Fs24000 => 24_000,
            SampleRate::Fs32000 => 32_000,
            SampleRate::Fs44100 => 44_100,
            SampleRate::Fs48000 => 48_000,
            SampleRate::Fs96000 => 96_000,
            SampleRate::Fs192000 => 192_000,
            SampleRate::Fs384000 => 384_000,
            SampleRate::Fs768000 => 768_000,
        }
    }
}

/// Data word size in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataWordSize {
    Bits8,
    Bits10,
    Bits12,
    Bits16,
    Bits18,
    Bits20,
    Bits24,
    Bits32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataInterfaceProtocol {
    I2s,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum I2sPairing {
    RightFirst,
    LeftFirst,
}

/// Operating power mode of a channel pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpPowerMode {
    #[default]
    Normal,
    Low,
    UltraLow,
}

/// Filtering latency/quality balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterLatency {
    High,
    Balanced,
    Low,
    UltraLow,
    ExtremeLow,
}

/// Internal hardware domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HwDomain {
    Analog,
    Digital,
    Both,
}

/// Internal blocks bypass mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassMode {
    NoBypass,
    DigitalFiltersBypass,
    AnalogPartBypass,
}

/// Digital filter gain in whole decibels, -64 dB to +63 dB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct DigitalGain(i8);

impl DigitalGain {
    pub const MIN_DB: i8 = -64;
    pub const MAX_DB: i8 = 63;

    pub fn new(db: i8) -> Result<Self> {
        if (Self::MIN_DB..=Self::MAX_DB).contains(&db) {
            Ok(Self(db))
        } else {
            Err(Error::OutOfRange {
                what: "digital gain",
                value: db.into(),
                max: Self::MAX_DB.into(),
            })
        }
    }

    pub fn db(self) -> i8 {
        self.0
    }
}

impl TryFrom<i8> for DigitalGain {
    type Error = Error;

    fn try_from(db: i8) -> Result<Self> {
        Self::new(db)
    }
}

impl From<DigitalGain> for i8 {
    fn from(gain: DigitalGain) -> i8 {
        gain.0
    }
}

/// Channel pair configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChanPairConfig {
    /// Data interface master (true) or slave
    pub data_interface_master: bool,
    pub sample_rate: SampleRate,
    pub data_word_size: DataWordSize,
    pub data_interface_protocol: DataInterfaceProtocol,
    pub i2s_pairing: I2sPairing,
    pub operating_power_mode: OpPowerMode,
    pub filter_latency: FilterLatency,
}

/// Audio ADC settings supplied by the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAdcSettings {
    /// Number of channels; always even
    pub chan_count: u32,
    /// Automatic level control available
    #[serde(default)]
    pub alc_supported: bool,
    /// Wind noise filter available
    #[serde(default)]
    pub wnf_supported: bool,
}

impl AudioAdcSettings {
    pub fn chan_pair_count(&self) -> u32 {
        self.chan_count / 2
    }
}

capability_table! {
    category AudioAdc(AudioAdcSettings);

    /// Operations an audio ADC backend may supply.
    pub struct AudioAdcOps {
        /// Configure the main clock frequency.
        fn clk_config(mclk: MclkFreq) -> ();
        fn hw_domain_enable(domain: HwDomain) -> ();
        fn hw_domain_disable(domain: HwDomain) -> ();
        fn set_bypass_mode(mode: BypassMode) -> ();
        /// True once the device acknowledges power-on and is ready to
        /// operate.
        fn get_power_on_ack() -> bool;
        /// Phase-align all streams sharing the same rate and filtering.
        fn resync() -> ();
        fn chan_pair_config(pair: u32, config: &ChanPairConfig) -> ();
        fn chan_pair_activate(pair: u32) -> ();
        fn chan_pair_deactivate(pair: u32) -> ();
        fn chan_pair_set_operational_power_mode(pair: u32, mode: OpPowerMode) -> ();
        fn chan_pair_get_operational_power_mode(pair: u32) -> OpPowerMode;
        fn chan_activate(chan: u32) -> ();
        fn chan_deactivate(chan: u32) -> ();
        fn chan_deactivate_all() -> ();
        fn chan_activate_mic_bias(chan: u32) -> ();
        fn chan_deactivate_mic_bias(chan: u32) -> ();
        /// Ramp the channel down to silence.
        fn chan_soft_mute(chan: u32) -> ();
        fn chan_soft_unmute(chan: u32) -> ();
        /// Cut the channel immediately.
        fn chan_hard_mute(chan: u32) -> ();
        fn chan_hard_unmute(chan: u32) -> ();
        fn chan_set_digital_gain(chan: u32, gain: DigitalGain) -> ();
        /// Enable the high-pass filter on `chan`.
        fn chan_enable_hpf(chan: u32) -> ();
        fn chan_disable_hpf(chan: u32) -> ();
    }
}

pub type AudioAdcHandle = Handle<AudioAdc>;
pub type AudioAdcConfig = Config<AudioAdc>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{calls, record, spy_handle};
    use test_case::test_case;

    fn spy_pair_config(
        handle: &mut AudioAdcHandle,
        pair: u32,
        config: &ChanPairConfig,
    ) -> Result<()> {
        record(
            handle,
            format!("chan_pair_config({}, {})", pair, config.sample_rate.hz()),
        )
    }

    fn spy_get_mode(handle: &mut AudioAdcHandle, pair: u32) -> Result<OpPowerMode> {
        record(handle, format!("chan_pair_get_operational_power_mode({})", pair))?;
        Ok(OpPowerMode::UltraLow)
    }

    static SPY: AudioAdcOps = AudioAdcOps {
        chan_pair_config: Some(spy_pair_config),
        chan_pair_get_operational_power_mode: Some(spy_get_mode),
        ..AudioAdcOps::EMPTY
    };

    fn pair_config() -> ChanPairConfig {
        ChanPairConfig {
            data_interface_master: true,
            sample_rate: SampleRate::Fs48000,
            data_word_size: DataWordSize::Bits24,
            data_interface_protocol: DataInterfaceProtocol::I2s,
            i2s_pairing: I2sPairing::LeftFirst,
            operating_power_mode: OpPowerMode::Normal,
            filter_latency: FilterLatency::Balanced,
        }
    }

    #[test]
    fn test_guards_on_every_unpopulated_slot() {
        let mut handle = spy_handle::<AudioAdc>(Some(&SPY));
        let results = [
            handle.clk_config(MclkFreq::F12288K),
            handle.resync(),
            handle.chan_activate(0),
            handle.chan_deactivate_all(),
            handle.chan_soft_mute(1),
            handle.chan_set_digital_gain(1, DigitalGain::new(-6).unwrap()),
            handle.chan_enable_hpf(2),
        ];
        for result in results {
            assert!(result.unwrap_err().is_invalid_argument());
        }
        assert!(handle.get_power_on_ack().unwrap_err().is_invalid_argument());
        assert!(calls(&handle).is_empty());
    }

    #[test]
    fn test_null_table() {
        let mut handle = spy_handle::<AudioAdc>(None);
        assert!(handle
            .chan_pair_config(1, &pair_config())
            .unwrap_err()
            .is_invalid_argument());
        assert!(chan_pair_get_operational_power_mode(Some(&mut handle), 1)
            .unwrap_err()
            .is_invalid_argument());
        assert!(handle.resync().unwrap_err().is_invalid_argument());
        assert!(handle.get_power_on_ack().unwrap_err().is_invalid_argument());
        assert!(calls(&handle).is_empty());
    }

    #[test]
    fn test_null_handle() {
        assert!(resync(None).unwrap_err().is_invalid_argument());
        assert!(get_power_on_ack(None).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_forwarding() {
        let mut handle = spy_handle::<AudioAdc>(Some(&SPY));
        chan_pair_config(Some(&mut handle), 1, &pair_config()).unwrap();
        assert_eq!(
            handle.chan_pair_get_operational_power_mode(1).unwrap(),
            OpPowerMode::UltraLow
        );
        assert_eq!(
            calls(&handle),
            [
                "chan_pair_config(1, 48000)",
                "chan_pair_get_operational_power_mode(1)"
            ]
        );
    }

    #[test_case(-64, true; "minimum")]
    #[test_case(0, true; "unity")]
    #[test_case(63, true; "maximum")]
    #[test_case(-65, false; "below minimum")]
    #[test_case(64, false; "above maximum")]
    fn test_digital_gain_range(db: i8, valid: bool) {
        assert_eq!(DigitalGain::new(db).is_ok(), valid);
    }

    #[test]
    fn test_digital_gain_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<DigitalGain>("-12").is_ok());
        assert!(serde_json::from_str::<DigitalGain>("100").is_err());
    }

    #[test]
    fn test_rates() {
        assert_eq!(MclkFreq::F11289K.hz(), 11_289_600);
        assert_eq!(SampleRate::Fs44100.hz(), 44_100);
    }
}
