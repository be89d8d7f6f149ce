use super::wavetable::Wavetable;

/*
Wavetable Oscillator
====================

A phase accumulator walking through a `Wavetable`.

Vocabulary
----------

  phase       Unsigned 32-bit fixed-point position. The top 16 bits are the
              cell index (masked to the table length), the low 16 bits are the
              fraction between cells.

  increment   How far `phase` moves per call. Derived from the frequency, the
              table length and the rate at which this oscillator is ticked:

                  increment = freq * cells / update_rate   (in 16.16)

  update rate How often `next()` is called. An audio oscillator is ticked at
              the audio rate, an LFO at the control rate. The same struct
              serves both; only `update_rate` differs.

Phase wraps for free: `u32` addition wraps at 2^32, and the index is masked,
so the table repeats every `cells << 16` phase units.


Two Ways to Set a Frequency
---------------------------

  set_freq(u32)      integer Hz, computed as hz * ((cells << 16) / rate).
                     The division happens once per table/rate pair, so the
                     per-call cost is a single multiply.

  set_freq_f32(f32)  fractional Hz for pitches from MIDI notes and sub-Hz LFOs.

Both round towards zero, which is where the "period is sampleRate/freq up to
phase-quantization rounding" caveat comes from.


Phase Modulation
----------------

`phase_modulate(offset)` advances exactly like `next()` but reads the table
at `phase + offset * cells`. `offset` is a Q15.16 fraction of one cycle:
65536 moves the read head by a whole cycle. No bounds checks; large offsets
wrap around the table.
*/

/// Fractional bits in the phase accumulator.
pub const PHASE_FRACTIONAL_BITS: u32 = 16;

#[derive(Debug, Clone)]
pub struct Oscillator {
    table: Wavetable,
    update_rate: u32,
    phase: u32,
    increment: u32,
    frequency: f32,
}

impl Oscillator {
    pub fn new(table: Wavetable, update_rate: u32) -> Self {
        Self {
            table,
            update_rate: update_rate.max(1),
            phase: 0,
            increment: 0,
            frequency: 0.0,
        }
    }

    /// Integer frequency path.
    pub fn set_freq(&mut self, hz: u32) {
        let cells = self.table.len() as u32;
        let per_hz = (cells << PHASE_FRACTIONAL_BITS) / self.update_rate;
        self.increment = hz.wrapping_mul(per_hz);
        self.frequency = hz as f32;
    }

    /// Fractional frequency path.
    pub fn set_freq_f32(&mut self, hz: f32) {
        let cells = self.table.len() as f32;
        let one = (1u32 << PHASE_FRACTIONAL_BITS) as f32;
        self.increment = ((cells * hz / self.update_rate as f32) * one) as u32;
        self.frequency = hz;
    }

    /// Advance one step and read the table at the new phase.
    #[inline]
    pub fn next(&mut self) -> i8 {
        self.advance();
        self.table.at((self.phase >> PHASE_FRACTIONAL_BITS) as usize)
    }

    /// Advance one step and read the table at `phase + offset * cells`.
    #[inline]
    pub fn phase_modulate(&mut self, offset: i32) -> i8 {
        self.advance();
        let cells = self.table.len() as u32;
        let shifted = self.phase.wrapping_add((offset as u32).wrapping_mul(cells));
        self.table.at((shifted >> PHASE_FRACTIONAL_BITS) as usize)
    }

    #[inline]
    fn advance(&mut self) {
        self.phase = self.phase.wrapping_add(self.increment);
    }

    pub fn set_phase(&mut self, phase: u32) {
        self.phase = phase;
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn phase_increment(&self) -> u32 {
        self.increment
    }

    /// Frequency as last set, in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn update_rate(&self) -> u32 {
        self.update_rate
    }

    pub fn table(&self) -> &Wavetable {
        &self.table
    }
}
