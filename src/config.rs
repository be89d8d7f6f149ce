//! Build-time configuration of the voice.
//!
//! Everything here is read once by [`FmEngine::new`](crate::synth::engine::FmEngine::new).
//! Nothing is persisted; hosts construct an `EngineConfig` in code, starting
//! from `Default`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::mapper::ParameterMap;
use crate::dsp::smooth::DEFAULT_SMOOTHNESS;
use crate::dsp::wavetable::{DEFAULT_CELLS, MAX_CELLS};
use crate::error::{Error, Result};
use crate::io::controls::RAW_MAX;
use crate::{AUDIO_RATE, CONTROL_RATE};

/// Envelope levels (0..=255) and stage lengths (milliseconds).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub attack_level: u8,
    /// Decay target; sustain holds it.
    pub decay_level: u8,
    pub release_level: u8,
    pub attack_ms: u16,
    pub decay_ms: u16,
    /// Safety timeout after which Sustain releases on its own.
    pub sustain_ms: u16,
    /// Initial release; the release knob overrides it every control tick.
    pub release_ms: u16,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack_level: 255,
            decay_level: 64,
            release_level: 150,
            attack_ms: 50,
            decay_ms: 200,
            sustain_ms: 10_000,
            release_ms: 200,
        }
    }
}

/// Raw-reading → parameter maps for the four control lines.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRanges {
    /// Release time in ms. Inverted: more knob, shorter release.
    pub release: ParameterMap,
    /// Filter cutoff, 0..=255. Inverted.
    pub filter_cutoff: ParameterMap,
    /// FM depth before LFO scaling. Inverted.
    pub intensity: ParameterMap,
    /// Intensity LFO speed in mHz.
    pub mod_speed: ParameterMap,
}

impl Default for ControlRanges {
    fn default() -> Self {
        let raw_max = RAW_MAX as i32;
        Self {
            release: ParameterMap::new(0, raw_max, 5000, 200),
            filter_cutoff: ParameterMap::new(0, raw_max, 200, 1),
            intensity: ParameterMap::new(0, raw_max, 400, 10),
            mod_speed: ParameterMap::new(0, raw_max, 1, 5000),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Audio samples per second; one `audio_update` per sample.
    pub audio_rate: u32,
    /// Control updates per second. Must divide `audio_rate`.
    pub control_rate: u32,
    /// Wavetable length shared by every oscillator.
    pub table_cells: usize,
    /// Modulator frequency as a multiple of the carrier.
    pub mod_ratio: u32,
    /// Carrier pitch before the first note arrives.
    pub initial_carrier_hz: u32,
    pub resonance: u8,
    /// α of the cutoff, release and FM-intensity smoothers.
    pub smoothness: f32,
    /// Added to the intensity LFO's signed output before scaling.
    pub lfo_offset: i32,
    /// Right shift applied after the intensity × LFO multiply.
    pub intensity_shift: u32,
    /// Second control-rate LFO wobbling the filter cutoff. 0 Hz or depth 0
    /// leaves the cutoff exactly as the knob sets it.
    pub cutoff_lfo_hz: f32,
    pub cutoff_lfo_depth: u8,
    /// Track each pot's observed travel instead of assuming 0..=1023.
    pub auto_range: bool,
    pub envelope: EnvelopeConfig,
    pub ranges: ControlRanges,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            audio_rate: AUDIO_RATE,
            control_rate: CONTROL_RATE,
            table_cells: DEFAULT_CELLS,
            mod_ratio: 5,
            initial_carrier_hz: 440,
            resonance: 20,
            smoothness: DEFAULT_SMOOTHNESS,
            lfo_offset: 128,
            intensity_shift: 8,
            cutoff_lfo_hz: 0.0,
            cutoff_lfo_depth: 0,
            auto_range: false,
            envelope: EnvelopeConfig::default(),
            ranges: ControlRanges::default(),
        }
    }
}

impl EngineConfig {
    /// Audio samples rendered between two control updates.
    pub fn samples_per_control(&self) -> u32 {
        self.audio_rate / self.control_rate.max(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.audio_rate == 0 || self.control_rate == 0 {
            return Err(Error::InvalidConfig(format!(
                "rates must be non-zero (audio {}, control {})",
                self.audio_rate, self.control_rate
            )));
        }
        if self.control_rate > self.audio_rate || self.audio_rate % self.control_rate != 0 {
            return Err(Error::InvalidConfig(format!(
                "control rate {} must divide audio rate {}",
                self.control_rate, self.audio_rate
            )));
        }
        if !self.table_cells.is_power_of_two() || !(2..=MAX_CELLS).contains(&self.table_cells) {
            return Err(Error::InvalidWavetable {
                len: self.table_cells,
            });
        }
        if ((self.table_cells as u64) << 16) < self.audio_rate as u64 {
            return Err(Error::InvalidConfig(format!(
                "audio rate {} too high for a {}-cell table",
                self.audio_rate, self.table_cells
            )));
        }
        if self.mod_ratio == 0 {
            return Err(Error::InvalidConfig("mod_ratio must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.smoothness) {
            return Err(Error::InvalidConfig(format!(
                "smoothness {} outside [0, 1)",
                self.smoothness
            )));
        }
        if self.intensity_shift > 16 {
            return Err(Error::InvalidConfig(format!(
                "intensity_shift {} too large",
                self.intensity_shift
            )));
        }

        let cutoff = self.ranges.filter_cutoff;
        if !within(cutoff, 0, u8::MAX as i32) {
            return Err(Error::InvalidConfig(format!(
                "filter cutoff range {}..{} must stay within 0..=255",
                cutoff.out_min, cutoff.out_max
            )));
        }
        let release = self.ranges.release;
        if !within(release, 0, u16::MAX as i32) {
            return Err(Error::InvalidConfig(format!(
                "release range {}..{} must stay within 0..=65535 ms",
                release.out_min, release.out_max
            )));
        }
        let intensity = self.ranges.intensity;
        if !within(intensity, 0, 1 << 15) {
            return Err(Error::InvalidConfig(format!(
                "intensity range {}..{} must be non-negative and below 32768",
                intensity.out_min, intensity.out_max
            )));
        }

        Ok(())
    }
}

fn within(map: ParameterMap, lo: i32, hi: i32) -> bool {
    (lo..=hi).contains(&map.out_min) && (lo..=hi).contains(&map.out_max)
}
