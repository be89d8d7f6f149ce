use crate::io::controls::ControlSource;
use crate::io::converter::sample_to_f32;
use crate::synth::engine::FmEngine;
use crate::synth::message::MessageReceiver;

/// Drives an [`FmEngine`] at both rates from a single audio callback.
///
/// Pending note messages are applied and one control update runs every
/// `samples_per_control` samples, immediately before the audio sample that
/// starts the new control period. So the very first sample rendered is
/// preceded by a control update.
pub struct Voice<R: MessageReceiver, C: ControlSource> {
    engine: FmEngine,
    rx: R,
    controls: C,
    samples_per_control: u32,
    countdown: u32,
}

impl<R: MessageReceiver, C: ControlSource> Voice<R, C> {
    pub fn new(engine: FmEngine, rx: R, controls: C, samples_per_control: u32) -> Self {
        Self {
            engine,
            rx,
            controls,
            samples_per_control: samples_per_control.max(1),
            countdown: 0,
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> i16 {
        if self.countdown == 0 {
            while let Some(msg) = self.rx.pop() {
                self.engine.handle_message(msg);
            }
            self.engine.control_update(&self.controls);
            self.countdown = self.samples_per_control;
        }
        self.countdown -= 1;

        self.engine.audio_update()
    }

    pub fn render(&mut self, out: &mut [i16]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Render into an `f32` buffer, scaled to roughly `-1.0..1.0`.
    pub fn render_f32(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = sample_to_f32(self.next_sample());
        }
    }

    pub fn engine(&self) -> &FmEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FmEngine {
        &mut self.engine
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    pub fn samples_per_control(&self) -> u32 {
        self.samples_per_control
    }
}
