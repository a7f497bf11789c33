//! Simulated audio ADC.
//!
//! The part reports power-on once it has a master clock and both hardware
//! domains are up. Pair settings are locked while the pair is active.

use super::{device_id, release};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::audioadc::{
    AudioAdc, AudioAdcConfig, AudioAdcHandle, AudioAdcOps, BypassMode, ChanPairConfig,
    DigitalGain, HwDomain, MclkFreq, OpPowerMode,
};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

#[derive(Debug, Default, Clone, Copy)]
struct Pair {
    config: Option<ChanPairConfig>,
    active: bool,
    power_mode: OpPowerMode,
}

#[derive(Debug, Default, Clone, Copy)]
struct Chan {
    active: bool,
    mic_bias: bool,
    soft_muted: bool,
    hard_muted: bool,
    gain: DigitalGain,
    hpf: bool,
}

#[derive(Debug)]
struct SimAudioAdc {
    mclk: Option<MclkFreq>,
    analog_on: bool,
    digital_on: bool,
    bypass: BypassMode,
    resyncs: u32,
    pairs: Vec<Pair>,
    chans: Vec<Chan>,
}

impl SimAudioAdc {
    fn powered(&self) -> bool {
        self.mclk.is_some() && self.analog_on && self.digital_on
    }

    fn any_active(&self) -> bool {
        self.pairs.iter().any(|p| p.active)
    }

    fn pair(&mut self, pair: u32) -> Result<&mut Pair> {
        let count = self.pairs.len() as u32;
        self.pairs.get_mut(pair as usize).ok_or(Error::OutOfRange {
            what: "audio adc channel pair",
            value: pair.into(),
            max: i64::from(count) - 1,
        })
    }
}

fn adc(handle: &mut AudioAdcHandle) -> Result<&mut SimAudioAdc> {
    handle.state_mut::<SimAudioAdc>()
}

fn chan(handle: &mut AudioAdcHandle, index: u32) -> Result<&mut Chan> {
    handle.check_resource("audio adc channel", index)?;
    Ok(&mut adc(handle)?.chans[index as usize])
}

fn init(slot: &mut Option<AudioAdcHandle>, config: &AudioAdcConfig) -> Result<()> {
    let settings = &config.settings;
    if settings.chan_count == 0 || settings.chan_count % 2 != 0 {
        return Err(Error::Config(format!(
            "audio adc channel count must be a non-zero multiple of 2, got {}",
            settings.chan_count
        )));
    }

    let adc = SimAudioAdc {
        mclk: None,
        analog_on: false,
        digital_on: false,
        bypass: BypassMode::NoBypass,
        resyncs: 0,
        pairs: vec![Pair::default(); settings.chan_pair_count() as usize],
        chans: vec![Chan::default(); settings.chan_count as usize],
    };
    let id = device_id(config.identifier)?;
    debug!(
        id,
        chan_count = settings.chan_count,
        alc = settings.alc_supported,
        wnf = settings.wnf_supported,
        "Simulated audio ADC initialized"
    );
    *slot = Some(Handle::new(id, settings.chan_count, adc));
    Ok(())
}

fn clk_config(handle: &mut AudioAdcHandle, mclk: MclkFreq) -> Result<()> {
    let adc = adc(handle)?;
    if adc.any_active() {
        return Err(Error::Busy);
    }
    adc.mclk = Some(mclk);
    debug!(mclk_hz = mclk.hz(), "Audio ADC master clock configured");
    Ok(())
}

fn set_domains(handle: &mut AudioAdcHandle, domain: HwDomain, on: bool) -> Result<()> {
    let adc = adc(handle)?;
    if !on && adc.any_active() {
        return Err(Error::Busy);
    }
    match domain {
        HwDomain::Analog => adc.analog_on = on,
        HwDomain::Digital => adc.digital_on = on,
        HwDomain::Both => {
            adc.analog_on = on;
            adc.digital_on = on;
        }
    }
    debug!(?domain, on, "Audio ADC hardware domain switched");
    Ok(())
}

fn hw_domain_enable(handle: &mut AudioAdcHandle, domain: HwDomain) -> Result<()> {
    set_domains(handle, domain, true)
}

fn hw_domain_disable(handle: &mut AudioAdcHandle, domain: HwDomain) -> Result<()> {
    set_domains(handle, domain, false)
}

fn set_bypass_mode(handle: &mut AudioAdcHandle, mode: BypassMode) -> Result<()> {
    adc(handle)?.bypass = mode;
    debug!(?mode, "Audio ADC bypass mode set");
    Ok(())
}

fn get_power_on_ack(handle: &mut AudioAdcHandle) -> Result<bool> {
    Ok(adc(handle)?.powered())
}

fn resync(handle: &mut AudioAdcHandle) -> Result<()> {
    let adc = adc(handle)?;
    if !adc.powered() {
        return Err(Error::Busy);
    }
    adc.resyncs += 1;
    debug!(resyncs = adc.resyncs, "Audio ADC resynchronized");
    Ok(())
}

fn chan_pair_config(handle: &mut AudioAdcHandle, pair: u32, config: &ChanPairConfig) -> Result<()> {
    let entry = adc(handle)?.pair(pair)?;
    if entry.active {
        return Err(Error::Busy);
    }
    entry.config = Some(*config);
    entry.power_mode = config.operating_power_mode;
    debug!(
        pair,
        sample_rate_hz = config.sample_rate.hz(),
        word_size = ?config.data_word_size,
        "Audio ADC channel pair configured"
    );
    Ok(())
}

fn chan_pair_activate(handle: &mut AudioAdcHandle, pair: u32) -> Result<()> {
    let entry = adc(handle)?.pair(pair)?;
    if entry.config.is_none() {
        return Err(Error::NotReady(format!("audio adc pair {} not configured", pair)));
    }
    entry.active = true;
    trace!(pair, "Audio ADC channel pair activated");
    Ok(())
}

fn chan_pair_deactivate(handle: &mut AudioAdcHandle, pair: u32) -> Result<()> {
    let adc = adc(handle)?;
    adc.pair(pair)?.active = false;
    for chan in &mut adc.chans[pair as usize * 2..pair as usize * 2 + 2] {
        chan.active = false;
    }
    trace!(pair, "Audio ADC channel pair deactivated");
    Ok(())
}

fn chan_pair_set_operational_power_mode(
    handle: &mut AudioAdcHandle,
    pair: u32,
    mode: OpPowerMode,
) -> Result<()> {
    let entry = adc(handle)?.pair(pair)?;
    if entry.active {
        return Err(Error::Busy);
    }
    entry.power_mode = mode;
    Ok(())
}

fn chan_pair_get_operational_power_mode(
    handle: &mut AudioAdcHandle,
    pair: u32,
) -> Result<OpPowerMode> {
    Ok(adc(handle)?.pair(pair)?.power_mode)
}

fn chan_activate(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    handle.check_resource("audio adc channel", index)?;
    let adc = adc(handle)?;
    if adc.pair(index / 2)?.config.is_none() {
        return Err(Error::NotReady(format!(
            "audio adc pair {} not configured",
            index / 2
        )));
    }
    adc.chans[index as usize].active = true;
    trace!(chan = index, "Audio ADC channel activated");
    Ok(())
}

fn chan_deactivate(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.active = false;
    Ok(())
}

fn chan_deactivate_all(handle: &mut AudioAdcHandle) -> Result<()> {
    for chan in &mut adc(handle)?.chans {
        chan.active = false;
    }
    trace!("All audio ADC channels deactivated");
    Ok(())
}

fn chan_activate_mic_bias(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.mic_bias = true;
    Ok(())
}

fn chan_deactivate_mic_bias(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.mic_bias = false;
    Ok(())
}

fn chan_soft_mute(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.soft_muted = true;
    Ok(())
}

fn chan_soft_unmute(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.soft_muted = false;
    Ok(())
}

fn chan_hard_mute(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.hard_muted = true;
    Ok(())
}

fn chan_hard_unmute(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.hard_muted = false;
    Ok(())
}

fn chan_set_digital_gain(handle: &mut AudioAdcHandle, index: u32, gain: DigitalGain) -> Result<()> {
    chan(handle, index)?.gain = gain;
    trace!(chan = index, db = gain.db(), "Audio ADC digital gain set");
    Ok(())
}

fn chan_enable_hpf(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.hpf = true;
    Ok(())
}

fn chan_disable_hpf(handle: &mut AudioAdcHandle, index: u32) -> Result<()> {
    chan(handle, index)?.hpf = false;
    Ok(())
}

pub static SIM_AUDIOADC_OPS: AudioAdcOps = AudioAdcOps {
    init: Some(init),
    deinit: Some(release::<AudioAdc>),
    clk_config: Some(clk_config),
    hw_domain_enable: Some(hw_domain_enable),
    hw_domain_disable: Some(hw_domain_disable),
    set_bypass_mode: Some(set_bypass_mode),
    get_power_on_ack: Some(get_power_on_ack),
    resync: Some(resync),
    chan_pair_config: Some(chan_pair_config),
    chan_pair_activate: Some(chan_pair_activate),
    chan_pair_deactivate: Some(chan_pair_deactivate),
    chan_pair_set_operational_power_mode: Some(chan_pair_set_operational_power_mode),
    chan_pair_get_operational_power_mode: Some(chan_pair_get_operational_power_mode),
    chan_activate: Some(chan_activate),
    chan_deactivate: Some(chan_deactivate),
    chan_deactivate_all: Some(chan_deactivate_all),
    chan_activate_mic_bias: Some(chan_activate_mic_bias),
    chan_deactivate_mic_bias: Some(chan_deactivate_mic_bias),
    chan_soft_mute: Some(chan_soft_mute),
    chan_soft_unmute: Some(chan_soft_unmute),
    chan_hard_mute: Some(chan_hard_mute),
    chan_hard_unmute: Some(chan_hard_unmute),
    chan_set_digital_gain: Some(chan_set_digital_gain),
    chan_enable_hpf: Some(chan_enable_hpf),
    chan_disable_hpf: Some(chan_disable_hpf),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-audioadc",
        description: "In-memory audio ADC with paired channels",
        table: BackendTable::AudioAdc(&SIM_AUDIOADC_OPS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::audioadc::{
        self, AudioAdcSettings, DataInterfaceProtocol, DataWordSize, FilterLatency, I2sPairing,
        SampleRate,
    };

    fn bring_up() -> AudioAdcHandle {
        let config = AudioAdcConfig::new(
            0,
            &SIM_AUDIOADC_OPS,
            AudioAdcSettings {
                chan_count: 4,
                alc_supported: false,
                wnf_supported: true,
            },
        );
        let mut slot = None;
        audioadc::init(&mut slot, Some(&config)).unwrap();
        slot.unwrap()
    }

    fn pair_config() -> ChanPairConfig {
        ChanPairConfig {
            data_interface_master: false,
            sample_rate: SampleRate::Fs16000,
            data_word_size: DataWordSize::Bits16,
            data_interface_protocol: DataInterfaceProtocol::I2s,
            i2s_pairing: I2sPairing::LeftFirst,
            operating_power_mode: OpPowerMode::Low,
            filter_latency: FilterLatency::Low,
        }
    }

    #[test]
    fn test_power_on_sequence() {
        let mut handle = bring_up();
        assert!(!handle.get_power_on_ack().unwrap());
        assert!(matches!(handle.resync(), Err(Error::Busy)));

        handle.clk_config(MclkFreq::F12288K).unwrap();
        handle.hw_domain_enable(HwDomain::Analog).unwrap();
        assert!(!handle.get_power_on_ack().unwrap());
        handle.hw_domain_enable(HwDomain::Digital).unwrap();
        assert!(handle.get_power_on_ack().unwrap());
        handle.resync().unwrap();

        handle.hw_domain_disable(HwDomain::Both).unwrap();
        assert!(!handle.get_power_on_ack().unwrap());
    }

    #[test]
    fn test_pair_lifecycle() {
        let mut handle = bring_up();
        assert!(matches!(handle.chan_pair_activate(1), Err(Error::NotReady(_))));
        assert!(matches!(handle.chan_activate(2), Err(Error::NotReady(_))));

        handle.chan_pair_config(1, &pair_config()).unwrap();
        assert_eq!(
            handle.chan_pair_get_operational_power_mode(1).unwrap(),
            OpPowerMode::Low
        );
        handle.chan_pair_activate(1).unwrap();
        handle.chan_activate(3).unwrap();

        assert!(matches!(
            handle.chan_pair_config(1, &pair_config()),
            Err(Error::Busy)
        ));
        assert!(matches!(
            handle.chan_pair_set_operational_power_mode(1, OpPowerMode::UltraLow),
            Err(Error::Busy)
        ));
        assert!(matches!(
            handle.clk_config(MclkFreq::F24576K),
            Err(Error::Busy)
        ));

        handle.chan_pair_deactivate(1).unwrap();
        assert!(!handle.state::<SimAudioAdc>().unwrap().chans[3].active);
        handle
            .chan_pair_set_operational_power_mode(1, OpPowerMode::UltraLow)
            .unwrap();
        assert_eq!(
            handle.chan_pair_get_operational_power_mode(1).unwrap(),
            OpPowerMode::UltraLow
        );
    }

    #[test]
    fn test_channel_controls() {
        let mut handle = bring_up();
        handle.chan_soft_mute(0).unwrap();
        handle.chan_hard_mute(0).unwrap();
        handle.chan_activate_mic_bias(1).unwrap();
        handle.chan_enable_hpf(1).unwrap();
        handle.chan_set_digital_gain(1, DigitalGain::new(-12).unwrap()).unwrap();

        let adc = handle.state::<SimAudioAdc>().unwrap();
        assert!(adc.chans[0].soft_muted && adc.chans[0].hard_muted);
        assert!(adc.chans[1].mic_bias && adc.chans[1].hpf);
        assert_eq!(adc.chans[1].gain.db(), -12);

        handle.chan_soft_unmute(0).unwrap();
        handle.chan_hard_unmute(0).unwrap();
        handle.chan_deactivate_mic_bias(1).unwrap();
        handle.chan_disable_hpf(1).unwrap();
        let adc = handle.state::<SimAudioAdc>().unwrap();
        assert!(!adc.chans[0].soft_muted && !adc.chans[0].hard_muted);
        assert!(!adc.chans[1].mic_bias && !adc.chans[1].hpf);
    }

    #[test]
    fn test_deactivate_all() {
        let mut handle = bring_up();
        handle.chan_pair_config(0, &pair_config()).unwrap();
        handle.chan_activate(0).unwrap();
        handle.chan_activate(1).unwrap();
        handle.chan_deactivate(1).unwrap();
        handle.chan_deactivate_all().unwrap();
        let adc = handle.state::<SimAudioAdc>().unwrap();
        assert!(adc.chans.iter().all(|c| !c.active));
    }

    #[test]
    fn test_index_ranges() {
        let mut handle = bring_up();
        assert!(matches!(handle.chan_soft_mute(4), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            handle.chan_pair_activate(2),
            Err(Error::OutOfRange { .. })
        ));
        handle.set_bypass_mode(BypassMode::AnalogPartBypass).unwrap();
    }

    #[test]
    fn test_odd_channel_count_rejected() {
        let config = AudioAdcConfig::new(
            0,
            &SIM_AUDIOADC_OPS,
            AudioAdcSettings {
                chan_count: 3,
                alc_supported: false,
                wnf_supported: false,
            },
        );
        let mut slot = None;
        assert!(matches!(
            audioadc::init(&mut slot, Some(&config)),
            Err(Error::Config(_))
        ));
    }
}
