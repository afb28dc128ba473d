/// Virtual MIDI output port.
///
/// On Unix backends (ALSA, CoreMIDI) the port is created in-process and shows
/// up in other applications like a hardware device. Platforms without virtual
/// port support get an error from `create`, which the transport factory turns
/// into the null sender.
use anyhow::anyhow;
use midir::MidiOutput;

use crate::{MidiSender, CLIENT_NAME};

pub struct VirtualPortSender {
    conn: midir::MidiOutputConnection,
    description: String,
}

impl VirtualPortSender {
    #[cfg(unix)]
    pub fn create(port_name: &str) -> anyhow::Result<Self> {
        use midir::os::unix::VirtualOutput;
        use tracing::info;

        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let conn = midi_out
            .create_virtual(port_name)
            .map_err(|e| anyhow!("create virtual port '{}': {}", port_name, e))?;

        info!(port_name = %port_name, "Virtual MIDI output port created");

        Ok(Self {
            conn,
            description: format!("virtual:{}", port_name),
        })
    }

    #[cfg(not(unix))]
    pub fn create(port_name: &str) -> anyhow::Result<Self> {
        Err(anyhow!(
            "virtual MIDI port '{}' not supported on this platform",
            port_name
        ))
    }
}

impl MidiSender for VirtualPortSender {
    fn send(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.conn
            .send(data)
            .map_err(|e| anyhow!("send on {}: {}", self.description, e))
    }

    fn name(&self) -> &str {
        &self.description
    }
}

/// Names of the MIDI output ports currently visible to the OS.
pub fn output_port_names() -> anyhow::Result<Vec<String>> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    Ok(midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect())
}
