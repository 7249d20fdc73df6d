//! Per-connection event pump.
//!
//! A [`HuiConnection`] owns one decoder and one ping monitor, upholding the
//! single-consumer rule of the engine through `&mut self`: all inbound
//! messages for the link are fed here, in arrival order, by one caller.
//! Decoded events and outbound messages travel over bounded channels so the
//! transport and the application model can live on their own threads.

use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use hui_protocol::{
    Decoder, EncodedMessages, Encoder, HuiMessage, LargeDisplaySlice, MeterSide, PingMonitor,
    ProtocolEvent, Role, SmallDisplay, Switch, TimeDisplay, VPot,
};

/// Connection parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Which end of the link this process is.
    pub role: Role,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    /// Capacity of the decoded-event channel.
    pub event_capacity: usize,
    /// Capacity of the outbound message channel.
    pub outbound_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            role: Role::Host,
            ping_interval: Duration::from_secs(1),
            ping_timeout: Duration::from_secs(5),
            event_capacity: 1024,
            outbound_capacity: 1024,
        }
    }
}

/// One logical link to a peer.
pub struct HuiConnection {
    role: Role,
    encoder: Encoder,
    decoder: Decoder,
    monitor: PingMonitor,
    alive: bool,
    events_tx: Sender<ProtocolEvent>,
    events_rx: Receiver<ProtocolEvent>,
    outbound_tx: Sender<HuiMessage>,
    outbound_rx: Receiver<HuiMessage>,
}

impl HuiConnection {
    pub fn new(config: ConnectionConfig) -> Self {
        let (events_tx, events_rx) = bounded(config.event_capacity);
        let (outbound_tx, outbound_rx) = bounded(config.outbound_capacity);
        debug!(role = ?config.role, "created connection");
        Self {
            role: config.role,
            encoder: Encoder::new(config.role),
            decoder: Decoder::new(config.role.peer()),
            monitor: PingMonitor::new(config.role, config.ping_interval, config.ping_timeout),
            alive: true,
            events_tx,
            events_rx,
            outbound_tx,
            outbound_rx,
        }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Receiver of decoded protocol events. Clones share the same queue.
    pub fn events(&self) -> Receiver<ProtocolEvent> {
        self.events_rx.clone()
    }

    /// Receiver the transport drains for messages to put on the wire.
    pub fn outbound(&self) -> Receiver<HuiMessage> {
        self.outbound_rx.clone()
    }

    /// Feed one raw MIDI message from the transport.
    pub fn feed_bytes(&mut self, bytes: &[u8]) {
        match HuiMessage::from_bytes(bytes) {
            Ok(message) => self.feed_message(&message),
            Err(e) => trace!("ignoring non-protocol bytes: {e}"),
        }
    }

    /// Feed one already-classified message from the transport.
    pub fn feed_message(&mut self, message: &HuiMessage) {
        if let Some(event) = self.decoder.decode(message) {
            self.monitor.observe(&event, Instant::now());
            if self.events_tx.try_send(event).is_err() {
                debug!("event channel full or disconnected; dropping event");
            }
        }
    }

    /// Drive the ping monitor. Queues a ping when due and returns the
    /// current liveness, logging alive/stale transitions.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        if let Some(ping) = self.monitor.tick(now) {
            self.queue(ping);
        }
        let alive = self.monitor.is_alive(now);
        if alive != self.alive {
            if alive {
                info!(role = ?self.role, "link restored");
            } else {
                warn!(role = ?self.role, "link stale: no ping from peer");
            }
            self.alive = alive;
        }
        alive
    }

    /// Liveness as of the last [`tick`](Self::tick).
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Clear decoder pairing state and restart the liveness clock.
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.monitor.reset(Instant::now());
        self.alive = true;
        info!(role = ?self.role, "connection reset");
    }

    // ==================== Typed send helpers ====================

    pub fn send_switch(&self, switch: Switch, on: bool) {
        self.queue_all(self.encoder.switch(switch, on));
    }

    pub fn send_fader_level(&self, channel: u8, level: u16) {
        self.queue_all(self.encoder.fader_level(channel, level));
    }

    pub fn send_fader_touch(&self, channel: u8, touched: bool) {
        self.queue_all(self.encoder.fader_touch(channel, touched));
    }

    pub fn send_vpot(&self, vpot: VPot, value: u8) {
        self.queue_all(self.encoder.vpot(vpot, value));
    }

    pub fn send_meter(&self, channel: u8, side: MeterSide, level: u8) {
        self.queue_all(self.encoder.meter(channel, side, level));
    }

    pub fn send_large_display(&self, slices: &[LargeDisplaySlice]) {
        self.queue_all(self.encoder.large_display(slices));
    }

    pub fn send_time_display(&self, display: &TimeDisplay) {
        self.queue_all(self.encoder.time_display(display));
    }

    pub fn send_small_display(&self, display: &SmallDisplay) {
        self.queue_all(self.encoder.small_display(display));
    }

    fn queue(&self, message: HuiMessage) {
        if self.outbound_tx.try_send(message).is_err() {
            debug!("outbound channel full or disconnected; dropping message");
        }
    }

    fn queue_all(&self, messages: EncodedMessages) {
        for message in messages {
            self.queue(message);
        }
    }
}
