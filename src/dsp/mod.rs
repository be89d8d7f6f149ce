//! Low-level DSP primitives used by the FM voice.
//!
//! These components are allocation-free and realtime-safe once constructed.
//! They work in the integer domain of an 8-bit voice: `i8` samples, `u8`
//! amplitudes, 16.16 phase, with every product kept at an explicit width so
//! the audio is bit-for-bit reproducible.

/// Attack/decay/sustain/release envelope, dual-rate.
pub mod envelope;
/// Two-pole resonant low-pass filter.
pub mod filter;
/// Linear raw-reading → parameter mapping.
pub mod mapper;
/// Phase-accumulator wavetable oscillator.
pub mod oscillator;
/// One-pole exponential smoothing of control values.
pub mod smooth;
/// Single-cycle 8-bit waveforms.
pub mod wavetable;

pub use envelope::{Envelope, EnvelopeState};
pub use filter::LowPassFilter;
pub use mapper::{AutoMap, AutoRange, ControlMapping, ParameterMap};
pub use oscillator::Oscillator;
pub use smooth::Smoother;
pub use wavetable::Wavetable;
