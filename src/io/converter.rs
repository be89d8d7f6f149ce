use crate::{
    io::midi::{MidiEvent, ALL_NOTES_OFF_CC},
    synth::message::SynthMessage,
};

/// Note events from any channel become synth messages; the voice is
/// single-timbral and does not filter by channel. A note-on with velocity 0
/// is a note-off, per running-status convention.
pub fn midi_to_synth(midi: MidiEvent) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn { key, velocity: 0, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity: 0,
        }),
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, velocity, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::ControlChange {
            controller: ALL_NOTES_OFF_CC,
            ..
        } => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Scale an output sample (8-bit domain, `-128..=127`) into `[-1.0, 1.0)`.
#[inline]
pub fn sample_to_f32(sample: i16) -> f32 {
    sample as f32 / 128.0
}
