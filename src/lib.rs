pub mod config; // Engine build parameters
pub mod dsp;
pub mod error;
pub mod io;
pub mod synth; // The FM voice and its rate driver

pub use config::{ControlRanges, EngineConfig, EnvelopeConfig};
pub use error::{Error, Result};
pub use io::controls::{ControlLine, ControlPanel, ControlReadings, ControlSource};
pub use synth::engine::FmEngine;
pub use synth::message::{MessageReceiver, SynthMessage};
pub use synth::voice::Voice;

/// Output samples per second.
pub const AUDIO_RATE: u32 = 16_384;
/// Control updates per second.
pub const CONTROL_RATE: u32 = 128;
