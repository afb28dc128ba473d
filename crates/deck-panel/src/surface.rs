//! The surface engine.
//!
//! Owns every piece of mutable panel state — button toggle flags, last
//! control values, the key press table, the active-note set — and turns
//! interaction events into messages. It does not send anything itself;
//! callers hand the returned messages to a transport.

use std::collections::HashMap;
use std::time::Instant;

use deck_protocol::message::MidiMessage;
use deck_protocol::velocity::KeyTracker;
use deck_protocol::DEFAULT_STRIKE_VELOCITY;

use crate::layout::{Control, ControlKind, PanelLayout};

pub struct Surface {
    channel: u8,
    controls: HashMap<String, Control>,
    /// Last emitted value per slider/knob.
    values: HashMap<String, u8>,
    /// Toggle state per button, all false at startup.
    buttons: HashMap<String, bool>,
    keys: KeyTracker,
    /// note -> velocity it was struck with
    active_notes: HashMap<u8, u8>,
}

impl Surface {
    pub fn new(layout: &PanelLayout, channel: u8) -> Self {
        let controls: HashMap<String, Control> = layout
            .controls()
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();
        let buttons = controls
            .values()
            .filter(|c| c.kind == ControlKind::Button)
            .map(|c| (c.id.clone(), false))
            .collect();

        Self {
            channel: channel.min(0x0F),
            controls,
            values: HashMap::new(),
            buttons,
            keys: KeyTracker::new(),
            active_notes: HashMap::new(),
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn kind_of(&self, id: &str) -> Option<ControlKind> {
        self.controls.get(id).map(|c| c.kind)
    }

    /// A slider or knob moved. Looks up the control's CC, clamps the value,
    /// and emits the Control Change. Unknown ids emit nothing.
    pub fn control_changed(&mut self, id: &str, value: u8) -> Option<MidiMessage> {
        let control = self.controls.get(id)?;
        if control.kind == ControlKind::Button {
            return None;
        }
        let msg = MidiMessage::control_change(self.channel, control.cc, value);
        if let MidiMessage::ControlChange { value, .. } = msg {
            self.values.insert(id.to_string(), value);
        }
        Some(msg)
    }

    /// A button was activated. Flips its toggle and emits 127 when it
    /// becomes active, 0 when it clears.
    pub fn button_pressed(&mut self, id: &str) -> Option<MidiMessage> {
        let cc = match self.controls.get(id) {
            Some(c) if c.kind == ControlKind::Button => c.cc,
            _ => return None,
        };
        let state = self.buttons.entry(id.to_string()).or_insert(false);
        *state = !*state;
        let value = if *state { 127 } else { 0 };
        Some(MidiMessage::control_change(self.channel, cc, value))
    }

    /// Force a button to a state without emitting; used when an external
    /// controller drives the panel.
    pub fn set_button(&mut self, id: &str, pressed: bool) {
        if let Some(state) = self.buttons.get_mut(id) {
            *state = pressed;
        }
    }

    pub fn button_state(&self, id: &str) -> Option<bool> {
        self.buttons.get(id).copied()
    }

    pub fn control_value(&self, id: &str) -> Option<u8> {
        self.values.get(id).copied()
    }

    /// A key went down. Starts its hold clock and emits Note On at the
    /// default strike velocity.
    pub fn press_key(&mut self, note: u8, at: Instant) -> MidiMessage {
        self.press_key_with_velocity(note, DEFAULT_STRIKE_VELOCITY, at)
    }

    /// A key went down with a velocity already known (external controller).
    pub fn press_key_with_velocity(&mut self, note: u8, velocity: u8, at: Instant) -> MidiMessage {
        let msg = MidiMessage::note_on(self.channel, note, velocity);
        if let MidiMessage::NoteOn { note, velocity, .. } = msg {
            self.keys.press(note, at);
            self.active_notes.insert(note, velocity);
        }
        msg
    }

    /// A key came up. Consumes the press record and emits Note Off with the
    /// velocity estimated from the hold duration. A release with no matching
    /// press emits nothing.
    pub fn release_key(&mut self, note: u8, at: Instant) -> Option<MidiMessage> {
        let note = note.min(0x7F);
        let velocity = self.keys.release(note, at)?;
        self.active_notes.remove(&note);
        Some(MidiMessage::note_off(self.channel, note, velocity))
    }

    /// A key came up with a velocity already known (external controller).
    /// Always emits; clears any press record for the note.
    pub fn release_key_with_velocity(&mut self, note: u8, velocity: u8) -> MidiMessage {
        let msg = MidiMessage::note_off(self.channel, note, velocity);
        if let MidiMessage::NoteOff { note, .. } = msg {
            self.keys.release(note, Instant::now());
            self.active_notes.remove(&note);
        }
        msg
    }

    pub fn active_note_count(&self) -> usize {
        self.active_notes.len()
    }

    /// Note Off for everything still sounding, each with the velocity it
    /// was struck with. Used at shutdown so no note hangs.
    pub fn all_notes_off(&mut self) -> Vec<MidiMessage> {
        let mut notes: Vec<(u8, u8)> = self.active_notes.drain().collect();
        notes.sort_unstable();
        notes
            .into_iter()
            .map(|(note, velocity)| MidiMessage::note_off(self.channel, note, velocity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn surface() -> Surface {
        Surface::new(&PanelLayout::standard(), 0)
    }

    #[test]
    fn test_slider_emits_cc() {
        let mut s = surface();
        let msg = s.control_changed("S1", 96).unwrap();
        assert_eq!(msg.encode(), [0xB0, 0x11, 96]);
        assert_eq!(s.control_value("S1"), Some(96));
    }

    #[test]
    fn test_control_value_clamped() {
        let mut s = surface();
        let msg = s.control_changed("R1", 255).unwrap();
        assert_eq!(msg.encode(), [0xB0, 0x10, 127]);
        assert_eq!(s.control_value("R1"), Some(127));
    }

    #[test]
    fn test_unknown_control_is_noop() {
        let mut s = surface();
        assert!(s.control_changed("S99", 10).is_none());
        assert!(s.button_pressed("Z1").is_none());
    }

    #[test]
    fn test_button_toggles_127_then_0() {
        let mut s = surface();
        assert_eq!(s.button_state("A1"), Some(false));

        let first = s.button_pressed("A1").unwrap();
        assert_eq!(first.encode(), [0xB0, 0x50, 127]);
        assert_eq!(s.button_state("A1"), Some(true));

        let second = s.button_pressed("A1").unwrap();
        assert_eq!(second.encode(), [0xB0, 0x50, 0]);
        assert_eq!(s.button_state("A1"), Some(false));
    }

    #[test]
    fn test_buttons_sharing_cc_toggle_independently() {
        let mut s = surface();
        s.button_pressed("A1");
        assert_eq!(s.button_state("A1"), Some(true));
        assert_eq!(s.button_state("A2"), Some(false));

        // A2 starts its own cycle at 127 despite sharing CC 0x50
        let msg = s.button_pressed("A2").unwrap();
        assert_eq!(msg.encode(), [0xB0, 0x50, 127]);
    }

    #[test]
    fn test_button_does_not_answer_control_changed() {
        let mut s = surface();
        assert!(s.control_changed("Sustain", 64).is_none());
    }

    #[test]
    fn test_key_press_release_cycle() {
        let mut s = surface();
        let t0 = Instant::now();

        let on = s.press_key(60, t0);
        assert_eq!(on.encode(), [0x90, 60, 100]);
        assert_eq!(s.active_note_count(), 1);

        let off = s.release_key(60, t0 + Duration::from_millis(275)).unwrap();
        assert_eq!(off.encode(), [0x80, 60, 64]);
        assert_eq!(s.active_note_count(), 0);
    }

    #[test]
    fn test_release_without_press_is_noop() {
        let mut s = surface();
        assert!(s.release_key(60, Instant::now()).is_none());
    }

    #[test]
    fn test_external_release_always_emits() {
        let mut s = surface();
        let msg = s.release_key_with_velocity(72, 55);
        assert_eq!(msg.encode(), [0x80, 72, 55]);
    }

    #[test]
    fn test_all_notes_off_drains_in_order() {
        let mut s = surface();
        let t0 = Instant::now();
        s.press_key_with_velocity(64, 80, t0);
        s.press_key(60, t0);

        let offs = s.all_notes_off();
        assert_eq!(offs.len(), 2);
        assert_eq!(offs[0].encode(), [0x80, 60, 100]);
        assert_eq!(offs[1].encode(), [0x80, 64, 80]);
        assert_eq!(s.active_note_count(), 0);
        assert!(s.all_notes_off().is_empty());
    }

    #[test]
    fn test_channel_applied_to_messages() {
        let mut s = Surface::new(&PanelLayout::standard(), 9);
        let msg = s.control_changed("H1", 1).unwrap();
        assert_eq!(msg.encode()[0], 0xB9);
        let on = s.press_key(40, Instant::now());
        assert_eq!(on.encode()[0], 0x99);
    }
}
