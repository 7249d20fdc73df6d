//! MIDI input: device enumeration and a callback-to-channel bridge.
//!
//! midir invokes its callback on an OS-owned thread; the callback only
//! copies bytes into a bounded channel. The single consumer that owns the
//! connection drains the channel and feeds the decoder, which keeps the
//! engine's one-writer rule intact.

use crossbeam_channel::{bounded, Receiver, Sender};
use midir::{MidiInput, MidiInputConnection};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct MidiInputDevice {
    pub index: usize,
    pub name: String,
}

/// Bridges a midir input port to a raw-byte channel.
pub struct MidiInputManager {
    bytes_tx: Sender<Vec<u8>>,
    bytes_rx: Receiver<Vec<u8>>,
    connection: Mutex<Option<MidiInputConnection<()>>>,
    connected_device: Arc<arc_swap::ArcSwap<Option<String>>>,
}

impl MidiInputManager {
    pub fn new(capacity: usize) -> Self {
        let (bytes_tx, bytes_rx) = bounded(capacity);
        Self {
            bytes_tx,
            bytes_rx,
            connection: Mutex::new(None),
            connected_device: Arc::new(arc_swap::ArcSwap::new(Arc::new(None))),
        }
    }

    /// Receiver of raw inbound MIDI messages, one `Vec<u8>` per message.
    pub fn bytes(&self) -> Receiver<Vec<u8>> {
        self.bytes_rx.clone()
    }

    pub fn list_devices() -> Vec<MidiInputDevice> {
        let mut devices = Vec::new();
        if let Ok(midi_input) = MidiInput::new("hui-device-list") {
            let ports = midi_input.ports();
            for (index, port) in ports.iter().enumerate() {
                let name = midi_input
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                devices.push(MidiInputDevice { index, name });
            }
        }
        devices
    }

    pub fn connect(&self, device_index: usize) -> crate::error::Result<()> {
        let midi_input = MidiInput::new("hui-midi-input")?;
        let ports = midi_input.ports();
        let port = ports.get(device_index).ok_or_else(|| {
            crate::error::Error::MidiDevice(format!("MIDI input device {} not found", device_index))
        })?;

        let port_name = midi_input
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", device_index));

        let tx = self.bytes_tx.clone();
        let connection = midi_input.connect(
            port,
            "hui-input",
            move |_timestamp, bytes, _| {
                if tx.try_send(bytes.to_vec()).is_err() {
                    trace!("input channel full; dropping MIDI message");
                }
            },
            (),
        )?;

        *self.connection.lock() = Some(connection);
        self.connected_device
            .store(Arc::new(Some(port_name.clone())));
        debug!(device = %port_name, "connected MIDI input");
        Ok(())
    }

    pub fn connect_by_name(&self, name: &str) -> crate::error::Result<()> {
        let devices = Self::list_devices();
        let device = devices
            .iter()
            .find(|d| d.name.to_lowercase().contains(&name.to_lowercase()))
            .ok_or_else(|| {
                crate::error::Error::MidiDevice(format!(
                    "No MIDI input device found matching '{}'",
                    name
                ))
            })?;
        self.connect(device.index)
    }

    pub fn disconnect(&self) {
        if let Some(connection) = self.connection.lock().take() {
            connection.close();
            self.connected_device.store(Arc::new(None));
            debug!("disconnected MIDI input");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    pub fn connected_device_name(&self) -> Option<String> {
        self.connected_device.load().as_ref().clone()
    }
}

impl Default for MidiInputManager {
    fn default() -> Self {
        Self::new(1024)
    }
}
