/*
Resonant Low-Pass Filter
========================

A two-pole integer low-pass with feedback, the classic "two leaky integrators
plus resonance" topology. Cheap enough to run once per sample on an 8-bit
signal with no floating point.

Vocabulary
----------

  cutoff      0..=255. Proportional, not Hz: it is the per-sample fraction
              (cutoff / 256) by which each stage moves toward its input.
              255 is nearly transparent, 1 barely moves.

  resonance   0..=255. Feedback of the band-pass difference (buf0 - buf1)
              into the first stage. Higher values emphasise the cutoff region.

  fb          Effective feedback, re-derived whenever the cutoff changes:
                  fb = q + q · (255 - cutoff) / 256
              Lower cutoffs get more feedback so the resonant peak stays
              audible across the sweep.


The Recurrence
--------------

    buf0 += ((in - buf0) + fb · (buf0 - buf1) / 256) · cutoff / 256
    buf1 += (buf0 - buf1) · cutoff / 256
    out   = buf1

buf0 and buf1 are the filter's only memory. They are 16-bit and wrap on
overflow, as does the second-stage product; a hard-driven high-resonance
filter rings and can fold over. That is a property of the sound, not a fault:
keep resonance moderate (the voice uses 20) if you want it to stay tame.


Parameter Timing
----------------

`set_cutoff` and `set_resonance` only touch coefficients. They take effect on
the next `next()` call. `set_resonance` stores q; fb is recomputed from it on
the next `set_cutoff`, which the control loop calls every tick anyway.
*/

const FX_SHIFT: u32 = 8;
const SHIFTED_ONE: u8 = 255;

#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    q: u8,
    cutoff: u8,
    fb: u16,
    buf0: i16,
    buf1: i16,
}

impl LowPassFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cutoff(&mut self, cutoff: u8) {
        self.cutoff = cutoff;
        let q = self.q as u16;
        self.fb = q + ((q * (SHIFTED_ONE - cutoff) as u16) >> FX_SHIFT);
    }

    pub fn set_resonance(&mut self, resonance: u8) {
        self.q = resonance;
    }

    pub fn set_cutoff_and_resonance(&mut self, cutoff: u8, resonance: u8) {
        self.set_resonance(resonance);
        self.set_cutoff(cutoff);
    }

    /// Filter one sample.
    #[inline]
    pub fn next(&mut self, input: i16) -> i16 {
        let f = self.cutoff as i32;
        let band = self.buf0.wrapping_sub(self.buf1);

        let feedback = (self.fb as i32).wrapping_mul(band as i32) >> FX_SHIFT;
        let drive = input.wrapping_sub(self.buf0) as i32 + feedback;
        let step0 = drive.wrapping_mul(f) >> FX_SHIFT;
        self.buf0 = (self.buf0 as i32).wrapping_add(step0) as i16;

        let band = self.buf0.wrapping_sub(self.buf1);
        let step1 = band.wrapping_mul(self.cutoff as i16) >> FX_SHIFT;
        self.buf1 = self.buf1.wrapping_add(step1);

        self.buf1
    }

    pub fn reset(&mut self) {
        self.buf0 = 0;
        self.buf1 = 0;
    }

    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    pub fn resonance(&self) -> u8 {
        self.q
    }

    pub fn feedback(&self) -> u16 {
        self.fb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Oscillator;
    use crate::dsp::wavetable::Wavetable;

    const AUDIO_RATE: u32 = 16_384;

    fn peak_after_transient(buffer: &[i16]) -> i16 {
        let skip = buffer.len().min(256);
        buffer[skip..].iter().map(|x| x.abs()).max().unwrap_or(0)
    }

    fn filtered_tone(filter: &mut LowPassFilter, hz: u32, samples: usize) -> Vec<i16> {
        let mut osc = Oscillator::new(Wavetable::sine(2048).unwrap(), AUDIO_RATE);
        osc.set_freq(hz);
        (0..samples).map(|_| filter.next(osc.next() as i16)).collect()
    }

    #[test]
    fn feedback_follows_reference_formula() {
        let mut filter = LowPassFilter::new();
        filter.set_resonance(20);
        filter.set_cutoff(100);
        // 20 + (20 * 155) >> 8 = 20 + 12
        assert_eq!(filter.feedback(), 32);

        filter.set_cutoff(255);
        assert_eq!(filter.feedback(), 20);
    }

    #[test]
    fn resonance_applies_on_next_cutoff_change() {
        let mut filter = LowPassFilter::new();
        filter.set_cutoff(100);
        filter.set_resonance(200);
        assert_eq!(filter.feedback(), 0);

        filter.set_cutoff(100);
        assert!(filter.feedback() > 200);
    }

    #[test]
    fn dc_passes_through() {
        let mut filter = LowPassFilter::new();
        filter.set_cutoff_and_resonance(120, 20);

        let mut out = 0;
        for _ in 0..2000 {
            out = filter.next(100);
        }
        // Both stages stall once their step rounds to zero, a few LSBs short.
        assert!((95..=100).contains(&out), "expected DC to settle near input, got {out}");
    }

    #[test]
    fn low_cutoff_attenuates_high_tones() {
        let mut open = LowPassFilter::new();
        open.set_cutoff_and_resonance(255, 20);
        let open_peak = peak_after_transient(&filtered_tone(&mut open, 2000, 2048));

        let mut closed = LowPassFilter::new();
        closed.set_cutoff_and_resonance(10, 20);
        let closed_peak = peak_after_transient(&filtered_tone(&mut closed, 2000, 2048));

        assert!(
            closed_peak * 4 < open_peak,
            "closed={closed_peak}, open={open_peak}"
        );
    }

    #[test]
    fn cutoff_change_is_not_retroactive() {
        let mut a = LowPassFilter::new();
        let mut b = LowPassFilter::new();
        a.set_cutoff_and_resonance(50, 20);
        b.set_cutoff_and_resonance(50, 20);

        for x in [10, 40, -30, 90] {
            a.next(x);
            b.next(x);
        }
        b.set_cutoff(200);
        assert_eq!((a.buf0, a.buf1), (b.buf0, b.buf1));

        assert_ne!(a.next(60), b.next(60));
    }

    #[test]
    fn high_resonance_rings_past_input() {
        let mut tame = LowPassFilter::new();
        tame.set_cutoff_and_resonance(30, 20);
        let tame_peak = peak_after_transient(&filtered_tone(&mut tame, 80, 4096));

        let mut ringing = LowPassFilter::new();
        ringing.set_cutoff_and_resonance(30, 250);
        let ring_peak = peak_after_transient(&filtered_tone(&mut ringing, 80, 4096));

        assert!(ring_peak > tame_peak, "ring={ring_peak}, tame={tame_peak}");
    }

    #[test]
    fn reset_clears_history() {
        let mut filter = LowPassFilter::new();
        filter.set_cutoff(128);
        filter.next(127);
        filter.reset();
        assert_eq!(filter.next(0), 0);
    }
}
