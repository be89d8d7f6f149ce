use midi_msg::{ChannelModeMsg, ChannelVoiceMsg, ControlChange, MidiMsg};

/// All Notes Off, surfaced as its controller number.
pub const ALL_NOTES_OFF_CC: u8 = 123;

/// MIDI channel-voice messages the voice can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Centred on 0, -8192..=8191.
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode exactly one complete message. Trailing bytes, truncated input,
    /// running status and anything that is not a channel message yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (msg, len) = MidiMsg::from_midi(bytes).ok()?;
        if len != bytes.len() {
            return None;
        }

        match msg {
            MidiMsg::ChannelVoice { channel, msg } => Self::from_voice(channel as u8, msg),
            MidiMsg::ChannelMode {
                channel,
                msg: ChannelModeMsg::AllNotesOff,
            } => Some(MidiEvent::ControlChange {
                channel: channel as u8,
                controller: ALL_NOTES_OFF_CC,
                value: 0,
            }),
            _ => None,
        }
    }

    fn from_voice(channel: u8, msg: ChannelVoiceMsg) -> Option<Self> {
        match msg {
            ChannelVoiceMsg::NoteOn { note, velocity } => Some(MidiEvent::NoteOn {
                channel,
                key: note,
                velocity,
            }),
            ChannelVoiceMsg::NoteOff { note, velocity } => Some(MidiEvent::NoteOff {
                channel,
                key: note,
                velocity,
            }),
            ChannelVoiceMsg::ControlChange {
                control: ControlChange::CC { control, value },
            } => Some(MidiEvent::ControlChange {
                channel,
                controller: control,
                value,
            }),
            ChannelVoiceMsg::ProgramChange { program } => {
                Some(MidiEvent::ProgramChange { channel, program })
            }
            ChannelVoiceMsg::PitchBend { bend } => Some(MidiEvent::PitchBend {
                channel,
                value: bend as i16 - 8192,
            }),
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_note_messages() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x92, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 2,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0x8F, 61, 40]),
            Some(MidiEvent::NoteOff {
                channel: 15,
                key: 61,
                velocity: 40
            })
        );
    }

    #[test]
    fn decodes_program_change() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xC4, 5]),
            Some(MidiEvent::ProgramChange {
                channel: 4,
                program: 5
            })
        );
    }

    #[test]
    fn pitch_bend_is_centred() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 8191
            })
        );
    }

    #[test]
    fn all_notes_off_keeps_its_controller_number() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xB1, ALL_NOTES_OFF_CC, 0]),
            Some(MidiEvent::ControlChange {
                channel: 1,
                controller: ALL_NOTES_OFF_CC,
                value: 0
            })
        );
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert_eq!(MidiEvent::from_bytes(&[0x90, 60, 100, 0x45, 0x10]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xC0, 5, 0x7F]), None);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(MidiEvent::from_bytes(&[]), None);
        assert_eq!(MidiEvent::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiEvent::from_bytes(&[60, 100]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xF8]), None);
    }
}
