pub mod message;
pub mod velocity;

/// Conventional baud rate for MIDI over a raw serial link
pub const MIDI_SERIAL_BAUD: u32 = 31250;

/// Default MIDI channel the surface emits on (channel 1, zero-based)
pub const DEFAULT_CHANNEL: u8 = 0;

/// Velocity used for Note On at press time; the hold duration — and with it
/// the estimated strike — is only known at release.
pub const DEFAULT_STRIKE_VELOCITY: u8 = 100;
