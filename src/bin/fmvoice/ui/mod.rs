//! TUI for fmvoice
//!
//! Plays the voice from the computer keyboard and shows knobs, voice state,
//! output scope and spectrum.

mod controls;
mod spectrum;
pub mod state;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use fm_voice::{ControlLine, ControlPanel, SynthMessage};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub use state::UiState;

use controls::{render_controls, render_voice};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Samples kept for the scope; also the FFT size.
const VIS_BUFFER_SIZE: usize = 1024;
/// Raw units moved per arrow key press.
const KNOB_STEP: i32 = 32;
const VELOCITY: u8 = 100;

/// Piano row: `a` is the bottom C of the current octave.
const PIANO_KEYS: [(char, u8); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

pub struct UiApp {
    audio_rx: Consumer<f32>,
    state_rx: Consumer<UiState>,
    note_tx: Producer<SynthMessage>,
    panel: Arc<ControlPanel>,
    current_state: UiState,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    /// Index into `ControlLine::ALL`
    selected: usize,
    octave: u8,
    held: Option<u8>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiState>,
        note_tx: Producer<SynthMessage>,
        panel: Arc<ControlPanel>,
        sample_rate: u32,
    ) -> Self {
        Self {
            audio_rx,
            state_rx,
            note_tx,
            panel,
            current_state: UiState::default(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            selected: 0,
            octave: 4,
            held: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_audio(&mut self) {
        let before = self.audio_buffer.len();
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }

        if self.audio_buffer.len() > before {
            let excess = self.audio_buffer.len().saturating_sub(VIS_BUFFER_SIZE);
            self.audio_buffer.drain(..excess);
            self.spectrum.update(&self.audio_buffer);
        }
    }

    fn poll_state(&mut self) {
        while let Ok(state) = self.state_rx.pop() {
            self.current_state = state;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.release(),
            KeyCode::Char('z') => self.octave = self.octave.saturating_sub(1),
            KeyCode::Char('x') => self.octave = (self.octave + 1).min(8),
            KeyCode::Up => self.selected = (self.selected + 3) % 4,
            KeyCode::Down | KeyCode::Tab => self.selected = (self.selected + 1) % 4,
            KeyCode::Left => self.nudge(-KNOB_STEP),
            KeyCode::Right => self.nudge(KNOB_STEP),
            KeyCode::Char(c) => {
                if let Some(&(_, offset)) = PIANO_KEYS.iter().find(|(k, _)| *k == c) {
                    self.press(12 * (self.octave + 1) + offset);
                }
            }
            _ => {}
        }
    }

    fn press(&mut self, note: u8) {
        self.send(SynthMessage::NoteOn {
            note,
            velocity: VELOCITY,
        });
        self.held = Some(note);
        debug!(note, "note on");
    }

    /// Terminals report no key releases, so space stands in for lifting the key.
    fn release(&mut self) {
        if let Some(note) = self.held.take() {
            self.send(SynthMessage::NoteOff { note, velocity: 0 });
            debug!(note, "note off");
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        if self.note_tx.push(msg).is_err() {
            warn!(?msg, "note queue full, dropping event");
        }
    }

    fn nudge(&self, delta: i32) {
        let line = ControlLine::ALL[self.selected];
        let raw = self.panel.nudge(line, delta);
        debug!(line = line.label(), raw, "knob moved");
    }

    fn render(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9), // Controls and voice
                Constraint::Min(8),    // Scope
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        render_controls(frame, top[0], &self.panel.snapshot(), self.selected);
        render_voice(frame, top[1], &self.current_state);
        render_waveform(frame, rows[1], &self.audio_buffer);
        render_spectrum(frame, rows[2], &self.spectrum);

        let help = Paragraph::new(format!(
            " [A-K] Play  [Space] Release  [Z/X] Octave ({})  [↑↓] Select  [←→] Adjust  [Q] Quit",
            self.octave
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[3]);
    }
}
