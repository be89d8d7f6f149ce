use std::f32::consts::TAU;
use std::sync::Arc;

use crate::error::{Error, Result};

/*
Wavetables
==========

A wavetable is one cycle of a waveform stored as signed 8-bit samples. The
oscillator never computes the waveform; it only looks cells up, so the cost
of a voice is independent of how rich the timbre is.

  cells      Number of samples in one cycle. Must be a power of two so the
             oscillator can wrap its index with a mask instead of a modulo.

  domain     i8, -128..=127. Everything downstream (filter, envelope, output
             shift) assumes this range.

The table is built once and shared between oscillators through an `Arc`, so
cloning a `Wavetable` never copies the samples.


Moog square
-----------

The default carrier timbre is a square wave as it comes out of a ladder
filter: odd harmonics only, rolled off a little faster than 1/n so the edges
are round instead of ringing.

    x(t) = sum over odd k <= 31 of  sin(2π k t) / k · 1 / (1 + (k / 12)²)

The sum is normalised so the loudest cell lands on ±127.
*/

/// Largest table the 16.16 phase accumulator can address without overflow.
pub const MAX_CELLS: usize = 1 << 15;

/// Default table length for the built-in waveforms.
pub const DEFAULT_CELLS: usize = 2048;

const MOOG_HARMONICS: usize = 31;
const MOOG_ROLLOFF: f32 = 12.0;

#[derive(Debug, Clone)]
pub struct Wavetable {
    cells: Arc<[i8]>,
}

impl Wavetable {
    /// Wrap a precomputed cycle. The length must be a power of two in
    /// `2..=MAX_CELLS`.
    pub fn new(cells: Vec<i8>) -> Result<Self> {
        let len = cells.len();
        if len < 2 || len > MAX_CELLS || !len.is_power_of_two() {
            return Err(Error::InvalidWavetable { len });
        }

        Ok(Self {
            cells: cells.into(),
        })
    }

    /// Band-limited, softened square wave.
    pub fn moog_square(len: usize) -> Result<Self> {
        Self::from_fn(len, |t| {
            (1..=MOOG_HARMONICS)
                .step_by(2)
                .map(|k| {
                    let k = k as f32;
                    let rolloff = 1.0 / (1.0 + (k / MOOG_ROLLOFF).powi(2));
                    (TAU * k * t).sin() / k * rolloff
                })
                .sum()
        })
    }

    /// Pure sine. Useful as a modulator or for tests that need a clean pitch.
    pub fn sine(len: usize) -> Result<Self> {
        Self::from_fn(len, |t| (TAU * t).sin())
    }

    /// Sample `shape` over one cycle (`t` in `[0, 1)`) and scale the result to
    /// fill the i8 range.
    fn from_fn(len: usize, shape: impl Fn(f32) -> f32) -> Result<Self> {
        if len < 2 || len > MAX_CELLS || !len.is_power_of_two() {
            return Err(Error::InvalidWavetable { len });
        }

        let raw: Vec<f32> = (0..len).map(|i| shape(i as f32 / len as f32)).collect();
        let peak = raw.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let scale = if peak > 0.0 { 127.0 / peak } else { 0.0 };

        Self::new(
            raw.into_iter()
                .map(|x| (x * scale).round().clamp(-128.0, 127.0) as i8)
                .collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Mask applied to a cell index; `len - 1` because the length is a power
    /// of two.
    #[inline]
    pub fn mask(&self) -> usize {
        self.cells.len() - 1
    }

    /// Read the cell at `index & mask`.
    #[inline]
    pub fn at(&self, index: usize) -> i8 {
        self.cells[index & self.mask()]
    }

    pub fn cells(&self) -> &[i8] {
        &self.cells
    }
}
