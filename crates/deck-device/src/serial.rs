/// Serial MIDI output.
///
/// Writes raw 3-byte MIDI messages to a serial device, mimicking a hardware
/// MIDI cable: no framing, no checksum, conventionally 31250 baud.
use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use serialport::SerialPort;
use tracing::info;

use crate::MidiSender;

/// Write timeout. Writes are best-effort; a stalled device should not
/// wedge the event loop.
const WRITE_TIMEOUT: Duration = Duration::from_millis(50);

pub struct SerialSender {
    port: Box<dyn SerialPort>,
    description: String,
}

impl SerialSender {
    pub fn open(path: &str, baud: u32) -> anyhow::Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(WRITE_TIMEOUT)
            .open()
            .with_context(|| format!("open serial port {}", path))?;

        info!(path = %path, baud, "Serial MIDI output opened");

        Ok(Self {
            port,
            description: format!("serial:{}", path),
        })
    }
}

impl MidiSender for SerialSender {
    fn send(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.port
            .write_all(data)
            .with_context(|| format!("write to {}", self.description))
    }

    fn name(&self) -> &str {
        &self.description
    }
}
