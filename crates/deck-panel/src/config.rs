//! Panel configuration persistence.
//!
//! One flat JSON file: the selected MIDI input device plus the mapping
//! table that ties external messages to panel controls. Loaded once at
//! startup; every save rewrites the whole file, last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use deck_protocol::message::MidiMessage;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PanelConfig {
    /// Input port the surface listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi_device: Option<String>,
    /// control id -> descriptor of the external message that drives it
    #[serde(default)]
    pub mappings: BTreeMap<String, MappingEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    ControlChange,
    NoteOn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingEntry {
    #[serde(rename = "type")]
    pub kind: MappingKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<u8>,
    pub channel: u8,
}

impl MappingEntry {
    /// Whether an incoming message is the one this entry describes.
    /// Note On with velocity 0 counts as the note's release, so it still
    /// matches a note entry.
    pub fn matches(&self, msg: &MidiMessage) -> bool {
        match (self.kind, *msg) {
            (
                MappingKind::ControlChange,
                MidiMessage::ControlChange {
                    channel, control, ..
                },
            ) => self.control == Some(control) && self.channel == channel,
            (MappingKind::NoteOn, MidiMessage::NoteOn { channel, note, .. }) => {
                self.note == Some(note) && self.channel == channel
            }
            _ => false,
        }
    }

    /// Descriptor for a captured message, or None when the message kind
    /// cannot drive a control.
    pub fn from_message(msg: &MidiMessage) -> Option<Self> {
        match *msg {
            MidiMessage::ControlChange {
                channel, control, ..
            } => Some(Self {
                kind: MappingKind::ControlChange,
                control: Some(control),
                note: None,
                channel,
            }),
            MidiMessage::NoteOn { channel, note, .. } => Some(Self {
                kind: MappingKind::NoteOn,
                control: None,
                note: Some(note),
                channel,
            }),
            MidiMessage::NoteOff { .. } => None,
        }
    }
}

/// Read the config file. A missing or malformed file yields the default
/// (empty) configuration — a broken config never stops the surface.
pub fn load(path: &Path) -> PanelConfig {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            info!(path = %path.display(), "No config file, starting with defaults");
            return PanelConfig::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(config) => {
            info!(path = %path.display(), "Config loaded");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err,
                "Malformed config, starting with defaults");
            PanelConfig::default()
        }
    }
}

/// Rewrite the config file wholesale.
pub fn save(path: &Path, config: &PanelConfig) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(config).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write config {}", path.display()))?;
    info!(path = %path.display(), "Config saved");
    Ok(())
}
