use serde::{Deserialize, Serialize};

// -- Status bytes (upper nibble; lower nibble carries the channel) --

pub const STATUS_NOTE_OFF: u8 = 0x80;
pub const STATUS_NOTE_ON: u8 = 0x90;
pub const STATUS_CONTROL_CHANGE: u8 = 0xB0;

/// Largest value a 7-bit MIDI data byte can carry.
pub const DATA_MAX: u8 = 0x7F;

/// Highest MIDI channel (channels are 0-15 on the wire).
pub const CHANNEL_MAX: u8 = 0x0F;

/// A channel voice message the surface can emit or receive.
///
/// Constructors clamp every field to its wire range, so a message that
/// exists cannot encode out-of-range bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MidiMessage {
    ControlChange { channel: u8, control: u8, value: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
}

impl MidiMessage {
    /// Wire size: status + two data bytes.
    pub const SIZE: usize = 3;

    pub fn control_change(channel: u8, control: u8, value: u8) -> Self {
        Self::ControlChange {
            channel: channel.min(CHANNEL_MAX),
            control: control.min(DATA_MAX),
            value: value.min(DATA_MAX),
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::NoteOn {
            channel: channel.min(CHANNEL_MAX),
            note: note.min(DATA_MAX),
            velocity: velocity.min(DATA_MAX),
        }
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::NoteOff {
            channel: channel.min(CHANNEL_MAX),
            note: note.min(DATA_MAX),
            velocity: velocity.min(DATA_MAX),
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            Self::ControlChange { channel, .. }
            | Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. } => channel,
        }
    }

    /// Pack into the 3-byte wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        match *self {
            Self::ControlChange {
                channel,
                control,
                value,
            } => [STATUS_CONTROL_CHANGE | channel, control, value],
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => [STATUS_NOTE_ON | channel, note, velocity],
            Self::NoteOff {
                channel,
                note,
                velocity,
            } => [STATUS_NOTE_OFF | channel, note, velocity],
        }
    }

    /// Parse the leading message out of raw MIDI bytes.
    /// Returns None for system messages, unsupported voice messages,
    /// truncated input, or data bytes with the high bit set.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE {
            return None;
        }

        let status = data[0];
        if status >= 0xF0 {
            return None;
        }

        let channel = status & CHANNEL_MAX;
        let (d1, d2) = (data[1], data[2]);
        if d1 > DATA_MAX || d2 > DATA_MAX {
            return None;
        }

        match status & 0xF0 {
            STATUS_NOTE_OFF => Some(Self::NoteOff {
                channel,
                note: d1,
                velocity: d2,
            }),
            STATUS_NOTE_ON => Some(Self::NoteOn {
                channel,
                note: d1,
                velocity: d2,
            }),
            STATUS_CONTROL_CHANGE => Some(Self::ControlChange {
                channel,
                control: d1,
                value: d2,
            }),
            _ => None,
        }
    }
}
