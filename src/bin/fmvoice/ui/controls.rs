//! Knob gauges and the voice readout

use fm_voice::{ControlLine, ControlReadings, ControlSource};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::state::UiState;

pub fn render_controls(frame: &mut Frame, area: Rect, knobs: &ControlReadings, selected: usize) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 4])
        .split(inner);

    for (i, line) in ControlLine::ALL.into_iter().enumerate() {
        let raw = knobs.read(line);
        let color = if i == selected { Color::Yellow } else { Color::Blue };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(raw as f64 / fm_voice::io::controls::RAW_MAX as f64)
            .label(format!("{:<10}{raw:>5}", line.label()));
        frame.render_widget(gauge, rows[i]);
    }
}

pub fn render_voice(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" Voice ").borders(Borders::ALL);

    let note = match state.note {
        Some(n) => n.to_string(),
        None => "-".to_string(),
    };
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().add_modifier(Modifier::BOLD);
    let field = |name: &'static str, text: String| {
        Line::from(vec![Span::styled(format!("{name:<11}"), label), Span::styled(text, value)])
    };

    let lines = vec![
        field("note", note),
        field("carrier", format!("{:.1} Hz", state.carrier_hz)),
        field("modulator", format!("{:.1} Hz", state.modulator_hz)),
        field("lfo", format!("{:.3} Hz", state.lfo_hz)),
        field("intensity", state.fm_intensity.to_string()),
        field("cutoff", state.cutoff.to_string()),
        field(
            "envelope",
            format!("{:?} {}", state.envelope_state, state.envelope_level),
        ),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
