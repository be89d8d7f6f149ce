//! Spectrum of the engine output
//!
//! Windowed FFT over the scope buffer, sampled at log-spaced frequencies so
//! the FM sidebands around the carrier stay readable.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

const BANDS: usize = 64;
const LOWEST_HZ: f64 = 30.0;
const FLOOR_DB: f64 = -90.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin read for each band
    bins: Vec<usize>,
    /// (log10 Hz, dB) per band
    points: Vec<(f64, f64)>,
    nyquist: f64,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: u32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(size);
        let last = (size.max(2) - 1) as f32;
        let window = (0..size)
            .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / last).cos())
            .collect();

        let nyquist = sample_rate as f64 / 2.0;
        let span = (nyquist / LOWEST_HZ).max(1.0);
        let top_bin = (size / 2).saturating_sub(1);

        let mut bins = Vec::with_capacity(BANDS);
        let mut points = Vec::with_capacity(BANDS);
        for band in 0..BANDS {
            let hz = LOWEST_HZ * span.powf(band as f64 / (BANDS - 1) as f64);
            let bin = (hz * size as f64 / sample_rate as f64).round() as usize;
            bins.push(bin.min(top_bin));
            points.push((hz.log10(), FLOOR_DB));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            bins,
            points,
            nyquist,
        }
    }

    /// Recompute from `samples`; ignored unless it is exactly the FFT size.
    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }

        for ((slot, &s), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = (self.window.len() as f32 / 2.0).powi(2);
        for (point, &bin) in self.points.iter_mut().zip(&self.bins) {
            let power = (self.scratch[bin].norm_sqr() / norm).max(1e-12);
            point.1 = (10.0 * (power as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn nyquist(&self) -> f64 {
        self.nyquist
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(analyzer.data());

    let (lo, hi) = (LOWEST_HZ.log10(), analyzer.nyquist().log10());
    let hz_label = |log_hz: f64| format!("{:.0}", 10f64.powf(log_hz));
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels(vec![hz_label(lo), hz_label((lo + hi) / 2.0), hz_label(hi)])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-90", "-45", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
