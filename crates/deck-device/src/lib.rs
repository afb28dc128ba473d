/// MIDI output transports and input listener.
///
/// This crate provides the `MidiSender` trait with serial, virtual-port, and
/// null implementations, plus the input side that feeds decoded messages into
/// a channel. Opening a transport never fails hard: an unavailable device
/// degrades to the null sender so the surface keeps running.

pub mod input;
pub mod serial;
pub mod virtual_port;

use tracing::warn;

/// Client name reported to the OS MIDI subsystem.
pub const CLIENT_NAME: &str = "midideck";

/// A best-effort sink for encoded MIDI bytes.
///
/// Writes are blocking and unacknowledged; callers log and drop failures
/// rather than retrying.
pub trait MidiSender: Send {
    /// Write one wire-encoded message.
    fn send(&mut self, data: &[u8]) -> anyhow::Result<()>;

    /// Human-readable transport description for logs.
    fn name(&self) -> &str;
}

/// Which output transport to open.
#[derive(Debug, Clone)]
pub enum TransportChoice {
    /// Virtual MIDI output port with the given display name.
    VirtualPort { port_name: String },
    /// Raw serial link, 3-byte MIDI at the given baud rate.
    Serial { path: String, baud: u32 },
    /// Discard everything.
    None,
}

/// Open the chosen transport, degrading to the null sender when the
/// device cannot be opened.
pub fn open_sender(choice: &TransportChoice) -> Box<dyn MidiSender> {
    match choice {
        TransportChoice::VirtualPort { port_name } => {
            match virtual_port::VirtualPortSender::create(port_name) {
                Ok(sender) => Box::new(sender),
                Err(err) => {
                    warn!(port_name = %port_name, error = %err,
                        "Virtual MIDI port unavailable, output disabled");
                    Box::new(NullSender::default())
                }
            }
        }
        TransportChoice::Serial { path, baud } => {
            match serial::SerialSender::open(path, *baud) {
                Ok(sender) => Box::new(sender),
                Err(err) => {
                    warn!(path = %path, error = %err,
                        "Serial port unavailable, output disabled");
                    Box::new(NullSender::default())
                }
            }
        }
        TransportChoice::None => Box::new(NullSender::default()),
    }
}

/// Write one message, logging and dropping it on failure. Transport
/// writes are best-effort; nothing retries.
pub fn send_best_effort(sender: &mut dyn MidiSender, data: &[u8]) {
    if let Err(err) = sender.send(data) {
        warn!(sender = sender.name(), error = %err, "MIDI write failed, message dropped");
    }
}

/// Sender that drops every message. Stands in when no transport is
/// configured or the configured one failed to open.
#[derive(Debug, Default)]
pub struct NullSender;

impl MidiSender for NullSender {
    fn send(&mut self, _data: &[u8]) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sender_accepts_everything() {
        let mut sender = NullSender;
        assert!(sender.send(&[0x90, 60, 100]).is_ok());
        assert!(sender.send(&[]).is_ok());
        assert_eq!(sender.name(), "null");
    }

    #[test]
    fn test_open_sender_none_is_null() {
        let mut sender = open_sender(&TransportChoice::None);
        assert_eq!(sender.name(), "null");
        assert!(sender.send(&[0xB0, 0x11, 0]).is_ok());
    }

    #[test]
    fn test_open_sender_degrades_on_bad_serial_path() {
        let choice = TransportChoice::Serial {
            path: "/dev/does-not-exist-midideck".to_string(),
            baud: deck_protocol::MIDI_SERIAL_BAUD,
        };
        let sender = open_sender(&choice);
        assert_eq!(sender.name(), "null");
    }
}
