//! External MIDI feedback and learn.
//!
//! Incoming messages from the configured input port drive the surface the
//! same way a local interaction would: a mapped CC or note moves its slider
//! or knob (which re-emits the control's own message) or sets a button's
//! state silently, and unmapped notes inside the keyboard range play the
//! keyboard. When learn is armed, the next eligible message becomes the
//! armed control's mapping instead.

use std::time::Instant;

use tracing::{debug, info};

use deck_protocol::message::MidiMessage;

use crate::config::{MappingEntry, PanelConfig};
use crate::layout::{self, ControlKind};
use crate::surface::Surface;

/// What applying one incoming message did.
#[derive(Debug, PartialEq)]
pub enum Applied {
    /// The armed control captured this message; the config changed and
    /// should be persisted.
    Learned { control_id: String },
    /// The surface changed; the listed messages go out the transport.
    Updated { emitted: Vec<MidiMessage> },
    /// Nothing on the panel answers to this message.
    Ignored,
}

#[derive(Debug, Default)]
pub struct FeedbackEngine {
    /// Control id waiting to capture its mapping.
    armed: Option<String>,
}

impl FeedbackEngine {
    pub fn new(armed: Option<String>) -> Self {
        Self { armed }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Arm learn for a control id; the next eligible message binds to it.
    pub fn arm(&mut self, control_id: String) {
        info!(control = %control_id, "Learn armed");
        self.armed = Some(control_id);
    }

    pub fn apply(
        &mut self,
        msg: &MidiMessage,
        config: &mut PanelConfig,
        surface: &mut Surface,
    ) -> Applied {
        if let Some(control_id) = self.armed.take() {
            match MappingEntry::from_message(msg) {
                Some(entry) => {
                    info!(control = %control_id, ?entry, "Learn captured");
                    config.mappings.insert(control_id.clone(), entry);
                    return Applied::Learned { control_id };
                }
                // Not learnable (e.g. Note Off); stay armed, fall through.
                None => self.armed = Some(control_id),
            }
        }

        match *msg {
            MidiMessage::ControlChange { value, .. } => {
                let targets = mapped_targets(msg, config);
                if targets.is_empty() {
                    debug!(?msg, "Unmapped message");
                    return Applied::Ignored;
                }
                apply_to_targets(&targets, value, value == 127, surface)
            }
            MidiMessage::NoteOn { note, velocity, .. } => {
                // A learned note mapping claims the note; the velocity is
                // the applied value. Unmapped notes play the keyboard.
                let targets = mapped_targets(msg, config);
                if !targets.is_empty() {
                    return apply_to_targets(&targets, velocity, velocity > 0, surface);
                }
                if !layout::in_keyboard_range(note) {
                    return Applied::Ignored;
                }
                // Velocity 0 is the note's release
                let emitted = if velocity > 0 {
                    surface.press_key_with_velocity(note, velocity, Instant::now())
                } else {
                    surface.release_key_with_velocity(note, velocity)
                };
                Applied::Updated {
                    emitted: vec![emitted],
                }
            }
            MidiMessage::NoteOff { note, velocity, .. } => {
                if !layout::in_keyboard_range(note) {
                    return Applied::Ignored;
                }
                Applied::Updated {
                    emitted: vec![surface.release_key_with_velocity(note, velocity)],
                }
            }
        }
    }
}

/// Every control id whose mapping describes this message. The mapping
/// table is many-to-one; all of them get the value.
fn mapped_targets(msg: &MidiMessage, config: &PanelConfig) -> Vec<String> {
    config
        .mappings
        .iter()
        .filter(|(_, entry)| entry.matches(msg))
        .map(|(id, _)| id.clone())
        .collect()
}

fn apply_to_targets(
    targets: &[String],
    value: u8,
    button_on: bool,
    surface: &mut Surface,
) -> Applied {
    let mut emitted = Vec::new();
    for id in targets {
        match surface.kind_of(id) {
            Some(ControlKind::Slider) | Some(ControlKind::Knob) => {
                // Moving the control re-emits its own message
                if let Some(out) = surface.control_changed(id, value) {
                    emitted.push(out);
                }
            }
            Some(ControlKind::Button) => {
                // External state set; the button does not echo
                surface.set_button(id, button_on);
            }
            None => debug!(control = %id, "Mapping names an unknown control"),
        }
    }
    Applied::Updated { emitted }
}
