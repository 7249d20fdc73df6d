//! MIDI output: device enumeration, connection, and message sending via a
//! dedicated thread.

use crossbeam_channel::{bounded, Receiver, Sender};
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::debug;

use hui_protocol::HuiMessage;

#[derive(Debug, Clone)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

enum MidiOutputCommand {
    Connect(usize),
    Disconnect,
    Send(HuiMessage),
    Shutdown,
}

/// Owns the midir output connection on its own thread; handles are cheap
/// clones that enqueue commands.
#[derive(Clone)]
pub struct MidiOutputManager {
    command_sender: Sender<MidiOutputCommand>,
    connected_device: Arc<arc_swap::ArcSwap<Option<String>>>,
    is_connected: Arc<AtomicBool>,
}

impl MidiOutputManager {
    pub fn new() -> Self {
        let (command_sender, command_receiver) = bounded(1024);
        let connected_device = Arc::new(arc_swap::ArcSwap::new(Arc::new(None)));
        let is_connected = Arc::new(AtomicBool::new(false));

        let connected_device_clone = Arc::clone(&connected_device);
        let is_connected_clone = Arc::clone(&is_connected);

        thread::Builder::new()
            .name("hui-midi-output".to_string())
            .spawn(move || {
                Self::output_thread(command_receiver, connected_device_clone, is_connected_clone);
            })
            .expect("Failed to spawn MIDI output thread");

        Self {
            command_sender,
            connected_device,
            is_connected,
        }
    }

    fn output_thread(
        command_receiver: Receiver<MidiOutputCommand>,
        connected_device: Arc<arc_swap::ArcSwap<Option<String>>>,
        is_connected: Arc<AtomicBool>,
    ) {
        let mut connection: Option<MidiOutputConnection> = None;

        loop {
            match command_receiver.recv_timeout(std::time::Duration::from_millis(100)) {
                Ok(MidiOutputCommand::Connect(device_index)) => {
                    if let Some(conn) = connection.take() {
                        drop(conn);
                    }

                    match Self::connect_to_device(device_index) {
                        Ok((conn, name)) => {
                            connection = Some(conn);
                            is_connected.store(true, Ordering::SeqCst);
                            connected_device.store(Arc::new(Some(name)));
                        }
                        Err(_e) => {
                            is_connected.store(false, Ordering::SeqCst);
                            connected_device.store(Arc::new(None));
                        }
                    }
                }
                Ok(MidiOutputCommand::Disconnect) => {
                    if let Some(conn) = connection.take() {
                        drop(conn);
                        is_connected.store(false, Ordering::SeqCst);
                        connected_device.store(Arc::new(None));
                    }
                }
                Ok(MidiOutputCommand::Send(message)) => {
                    if let Some(ref mut conn) = connection {
                        let _ = conn.send(&message.to_bytes());
                    } else {
                        debug!("Cannot send MIDI message: no device connected");
                    }
                }
                Ok(MidiOutputCommand::Shutdown) => {
                    if let Some(conn) = connection.take() {
                        drop(conn);
                    }
                    break;
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    break;
                }
            }
        }
    }

    fn connect_to_device(
        device_index: usize,
    ) -> Result<(MidiOutputConnection, String), crate::error::Error> {
        let midi_output = MidiOutput::new("hui-midi-output")?;

        let ports = midi_output.ports();
        let port = ports.get(device_index).ok_or_else(|| {
            crate::error::Error::MidiDevice(format!(
                "MIDI output device {} not found",
                device_index
            ))
        })?;

        let port_name = midi_output
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", device_index));

        let connection = midi_output.connect(port, "hui-output")?;

        Ok((connection, port_name))
    }

    pub fn list_devices() -> Vec<MidiOutputDevice> {
        let mut devices = Vec::new();
        if let Ok(midi_output) = MidiOutput::new("hui-device-list") {
            let ports = midi_output.ports();
            for (index, port) in ports.iter().enumerate() {
                let name = midi_output
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                devices.push(MidiOutputDevice { index, name });
            }
        }
        devices
    }

    pub fn connect(&self, device_index: usize) -> crate::error::Result<()> {
        self.command_sender
            .send(MidiOutputCommand::Connect(device_index))
            .map_err(|_| {
                crate::error::Error::MidiDevice("MIDI output thread not running".to_string())
            })
    }

    pub fn connect_by_name(&self, name: &str) -> crate::error::Result<()> {
        let devices = Self::list_devices();
        let device = devices
            .iter()
            .find(|d| d.name.to_lowercase().contains(&name.to_lowercase()))
            .ok_or_else(|| {
                crate::error::Error::MidiDevice(format!(
                    "No MIDI output device found matching '{}'",
                    name
                ))
            })?;
        self.connect(device.index)
    }

    pub fn disconnect(&self) {
        let _ = self.command_sender.send(MidiOutputCommand::Disconnect);
    }

    /// Queue one message for the wire. Non-blocking; logs when the command
    /// channel is saturated.
    pub fn send(&self, message: HuiMessage) {
        if let Err(e) = self.command_sender.try_send(MidiOutputCommand::Send(message)) {
            debug!("MIDI output command channel full or disconnected: {}", e);
        }
    }

    /// Drain a connection's outbound queue onto the wire.
    pub fn pump(&self, outbound: &Receiver<HuiMessage>) {
        for message in outbound.try_iter() {
            self.send(message);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    pub fn connected_device_name(&self) -> Option<String> {
        self.connected_device.load().as_ref().clone()
    }
}

impl Default for MidiOutputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MidiOutputManager {
    fn drop(&mut self) {
        let _ = self.command_sender.send(MidiOutputCommand::Shutdown);
    }
}
