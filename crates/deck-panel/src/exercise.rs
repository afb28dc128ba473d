//! Synthetic surface exercise.
//!
//! Drives the panel through a deterministic interaction sequence so a
//! transport (or the device on the far end) can be checked without a
//! front end: slider ramps, button toggles, and a keyboard scale whose
//! hold times walk the whole velocity window.

use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use deck_device::{send_best_effort, MidiSender};
use deck_protocol::message::MidiMessage;

use crate::layout::{ControlKind, PanelLayout, KEYBOARD_BASE_NOTE};
use crate::surface::Surface;

/// Which sequence to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseProfile {
    /// Ramp every slider, park every knob at center.
    Sweep,
    /// One octave of C major with hold times from soft to hard.
    Scale,
    /// Sweep, then every button twice, then the scale.
    Full,
}

impl ExerciseProfile {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sweep" => Self::Sweep,
            "scale" => Self::Scale,
            "full" => Self::Full,
            _ => Self::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sweep => "sweep",
            Self::Scale => "scale",
            Self::Full => "full",
        }
    }
}

/// Major scale degrees over one octave.
const SCALE_OFFSETS: [u8; 8] = [0, 2, 4, 5, 7, 9, 11, 12];

/// Hold multipliers per scale step; with the default pacing these span
/// the saturating-soft through saturating-hard strikes.
const HOLD_STEPS: [u32; 8] = [32, 28, 24, 20, 16, 12, 8, 4];

/// Values a slider ramp walks through.
const RAMP: [u8; 9] = [0, 16, 32, 48, 64, 80, 96, 112, 127];

/// Play the profile through the surface and out the sender.
/// `pacing` is the gap between messages; hold times scale from it.
/// Returns the number of messages emitted.
pub fn run(
    profile: ExerciseProfile,
    layout: &PanelLayout,
    surface: &mut Surface,
    sender: &mut dyn MidiSender,
    pacing: Duration,
) -> usize {
    info!(profile = profile.as_str(), sender = sender.name(), "Exercise started");

    let mut sent = 0usize;

    if matches!(profile, ExerciseProfile::Sweep | ExerciseProfile::Full) {
        for control in layout.controls() {
            match control.kind {
                ControlKind::Slider => {
                    for value in RAMP {
                        if let Some(msg) = surface.control_changed(&control.id, value) {
                            emit(msg, sender, &mut sent, pacing);
                        }
                    }
                }
                ControlKind::Knob => {
                    if let Some(msg) = surface.control_changed(&control.id, 64) {
                        emit(msg, sender, &mut sent, pacing);
                    }
                }
                ControlKind::Button => {}
            }
        }
    }

    if profile == ExerciseProfile::Full {
        for control in layout.controls() {
            if control.kind == ControlKind::Button {
                // Toggle on, toggle off
                for _ in 0..2 {
                    if let Some(msg) = surface.button_pressed(&control.id) {
                        emit(msg, sender, &mut sent, pacing);
                    }
                }
            }
        }
    }

    if matches!(profile, ExerciseProfile::Scale | ExerciseProfile::Full) {
        for (offset, hold_steps) in SCALE_OFFSETS.iter().zip(HOLD_STEPS) {
            let note = KEYBOARD_BASE_NOTE + offset;
            let msg = surface.press_key(note, Instant::now());
            emit(msg, sender, &mut sent, pacing);

            thread::sleep(pacing * hold_steps);

            if let Some(msg) = surface.release_key(note, Instant::now()) {
                emit(msg, sender, &mut sent, pacing);
            }
        }
    }

    info!(messages = sent, "Exercise finished");
    sent
}

fn emit(msg: MidiMessage, sender: &mut dyn MidiSender, sent: &mut usize, pacing: Duration) {
    send_best_effort(sender, &msg.encode());
    *sent += 1;
    thread::sleep(pacing);
}
