//! Integration tests for the deck-protocol crate.
//!
//! These tests exercise the public API across module boundaries,
//! verifying that the message codec and the velocity estimator behave
//! correctly together under realistic interaction sequences.

use std::time::{Duration, Instant};

use deck_protocol::message::MidiMessage;
use deck_protocol::velocity::{
    velocity_between, velocity_for_hold, KeyTracker, MAX_HOLD, MIN_HOLD,
};
use deck_protocol::{DEFAULT_CHANNEL, DEFAULT_STRIKE_VELOCITY};

// ---------------------------------------------------------------------------
// 1. Message codec -- wire form and roundtrips
// ---------------------------------------------------------------------------

#[test]
fn control_change_roundtrip() {
    let msg = MidiMessage::control_change(DEFAULT_CHANNEL, 0x11, 96);
    let wire = msg.encode();

    assert_eq!(wire[0], 0xB0);
    assert_eq!(MidiMessage::decode(&wire), Some(msg));
}

#[test]
fn note_roundtrip_every_channel() {
    for channel in 0..16 {
        let on = MidiMessage::note_on(channel, 60, 100);
        let off = MidiMessage::note_off(channel, 60, 40);

        assert_eq!(on.encode()[0], 0x90 | channel);
        assert_eq!(off.encode()[0], 0x80 | channel);
        assert_eq!(MidiMessage::decode(&on.encode()), Some(on));
        assert_eq!(MidiMessage::decode(&off.encode()), Some(off));
    }
}

#[test]
fn decode_ignores_trailing_bytes() {
    // A serial read may hand back more than one message worth of bytes;
    // decode parses the leading message only.
    let bytes = [0xB0, 0x13, 64, 0x90, 60, 100];
    assert_eq!(
        MidiMessage::decode(&bytes),
        Some(MidiMessage::control_change(0, 0x13, 64))
    );
}

// ---------------------------------------------------------------------------
// 2. Velocity estimator -- boundary values
// ---------------------------------------------------------------------------

#[test]
fn estimator_boundary_values() {
    // Press at t=0, release at t=0.05s -> 127
    assert_eq!(velocity_for_hold(Duration::from_millis(50)), 127);
    // Press at t=0, release at t=0.5s -> 1
    assert_eq!(velocity_for_hold(Duration::from_millis(500)), 1);
    // Press at t=0, release at t=0.275s -> ~64
    assert_eq!(velocity_for_hold(Duration::from_millis(275)), 64);
}

#[test]
fn estimator_window_constants() {
    assert_eq!(MIN_HOLD, Duration::from_millis(50));
    assert_eq!(MAX_HOLD, Duration::from_millis(500));
}

#[test]
fn estimator_on_instants_matches_duration_form() {
    let press = Instant::now();
    for ms in [0u64, 50, 120, 275, 500, 900] {
        let release = press + Duration::from_millis(ms);
        assert_eq!(
            velocity_between(press, release),
            velocity_for_hold(Duration::from_millis(ms))
        );
    }
    // A release instant before the press saturates hard, it never panics
    assert_eq!(velocity_between(press + Duration::from_secs(1), press), 127);
}

// ---------------------------------------------------------------------------
// 3. Tracker + codec -- a full press/release interaction
// ---------------------------------------------------------------------------

#[test]
fn keystroke_produces_note_on_then_off() {
    let mut tracker = KeyTracker::new();
    let t0 = Instant::now();
    let note = 48;

    tracker.press(note, t0);
    let on = MidiMessage::note_on(DEFAULT_CHANNEL, note, DEFAULT_STRIKE_VELOCITY);
    assert_eq!(on.encode(), [0x90, 48, 100]);

    let velocity = tracker
        .release(note, t0 + Duration::from_millis(275))
        .expect("press was recorded");
    let off = MidiMessage::note_off(DEFAULT_CHANNEL, note, velocity);
    assert_eq!(off.encode(), [0x80, 48, 64]);
}

#[test]
fn overlapping_keystrokes_tracked_independently() {
    let mut tracker = KeyTracker::new();
    let t0 = Instant::now();

    tracker.press(60, t0);
    tracker.press(64, t0 + Duration::from_millis(100));

    // The later key releases first
    assert_eq!(tracker.release(64, t0 + Duration::from_millis(150)), Some(127));
    // The earlier key held 500 ms in total
    assert_eq!(tracker.release(60, t0 + Duration::from_millis(500)), Some(1));
}

#[test]
fn stray_release_emits_nothing() {
    let mut tracker = KeyTracker::new();
    assert!(tracker.release(96, Instant::now()).is_none());
}
