//! FmVoiceApp - audio stream setup and the hand-off to the TUI

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use std::sync::Arc;
use tracing::{error, info};

use fm_voice::{
    io::converter::sample_to_f32, ControlPanel, ControlReadings, EngineConfig, FmEngine,
    SynthMessage, Voice,
};

use super::ui::{UiApp, UiState};

/// Note events queued between UI key presses and the audio callback.
const NOTE_QUEUE_SIZE: usize = 64;
/// Engine-rate samples buffered for the scope and spectrum.
const TAP_SIZE: usize = 16_384;

pub struct FmVoiceApp {
    config: EngineConfig,
}

impl FmVoiceApp {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Open the default output device, start the voice on it and run the UI
    /// until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let device_rate = stream_config.sample_rate().0;
        let channels = stream_config.channels() as usize;
        info!(device_rate, channels, engine_rate = self.config.audio_rate, "opening output");

        let engine = FmEngine::new(&self.config).wrap_err("invalid engine configuration")?;
        let panel = Arc::new(ControlPanel::new(ControlReadings::default()));

        let (note_tx, note_rx) = RingBuffer::<SynthMessage>::new(NOTE_QUEUE_SIZE);
        let (mut tap_tx, tap_rx) = RingBuffer::<f32>::new(TAP_SIZE);
        let (mut state_tx, state_rx) = RingBuffer::<UiState>::new(16);

        let mut voice = Voice::new(
            engine,
            note_rx,
            Arc::clone(&panel),
            self.config.samples_per_control(),
        );
        let mut resampler = Resampler::new(self.config.audio_rate, device_rate);

        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| {
                for frame in data.chunks_mut(channels) {
                    let s = resampler.next(|| {
                        let sample = sample_to_f32(voice.next_sample());
                        // Scope falls behind rather than blocking audio.
                        let _ = tap_tx.push(sample);
                        sample
                    });
                    frame.fill(s);
                }
                let _ = state_tx.push(UiState::capture(voice.engine()));
            },
            |err| error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(
            tap_rx,
            state_rx,
            note_tx,
            panel,
            self.config.audio_rate,
        )
        .run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

/// Linear-interpolating rate converter from the engine's fixed rate to the
/// device rate.
struct Resampler {
    step: f64,
    pos: f64,
    prev: f32,
    next: f32,
}

impl Resampler {
    fn new(source_rate: u32, target_rate: u32) -> Self {
        Self {
            step: source_rate as f64 / target_rate.max(1) as f64,
            // Pull two source samples before the first output.
            pos: 2.0,
            prev: 0.0,
            next: 0.0,
        }
    }

    #[inline]
    fn next(&mut self, mut source: impl FnMut() -> f32) -> f32 {
        while self.pos >= 1.0 {
            self.prev = self.next;
            self.next = source();
            self.pos -= 1.0;
        }
        let out = self.prev + (self.next - self.prev) * self.pos as f32;
        self.pos += self.step;
        out
    }
}
