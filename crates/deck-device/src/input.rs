//! MIDI input listener.
//!
//! Decodes incoming bytes on the OS MIDI callback thread and forwards them
//! into an `mpsc` channel; all surface state stays owned by the consumer.

use std::sync::mpsc::Sender;

use anyhow::anyhow;
use midir::{Ignore, MidiInput, MidiInputConnection};
use tracing::info;

use deck_protocol::message::MidiMessage;

use crate::CLIENT_NAME;

/// Open input connection. RAII — dropping it closes the port.
pub struct InputConnection {
    _conn: MidiInputConnection<()>,
    port_name: String,
}

impl InputConnection {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Names of the MIDI input ports currently visible to the OS.
pub fn input_port_names() -> anyhow::Result<Vec<String>> {
    let midi_in = new_input()?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// Connect to the named input port and forward every decodable channel
/// voice message into `tx`. The name must match a visible port exactly,
/// or by substring as a fallback.
pub fn connect(port_name: &str, tx: Sender<MidiMessage>) -> anyhow::Result<InputConnection> {
    let midi_in = new_input()?;

    let ports = midi_in.ports();
    let name_of = |p: &midir::MidiInputPort| midi_in.port_name(p).unwrap_or_default();
    let port = ports
        .iter()
        .find(|p| name_of(p) == port_name)
        .or_else(|| ports.iter().find(|p| name_of(p).contains(port_name)))
        .ok_or_else(|| anyhow!("MIDI input port '{}' not found", port_name))?;

    let resolved = midi_in.port_name(port).unwrap_or_else(|_| port_name.to_string());

    let conn = midi_in
        .connect(
            port,
            CLIENT_NAME,
            move |_stamp, bytes, _| {
                if let Some(msg) = MidiMessage::decode(bytes) {
                    tx.send(msg).ok();
                }
            },
            (),
        )
        .map_err(|e| anyhow!("connect to '{}': {}", resolved, e))?;

    info!(port = %resolved, "MIDI input connected");

    Ok(InputConnection {
        _conn: conn,
        port_name: resolved,
    })
}

fn new_input() -> anyhow::Result<MidiInput> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(Ignore::None);
    Ok(midi_in)
}
