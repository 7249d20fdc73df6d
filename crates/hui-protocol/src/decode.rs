//! The receive-side state machine.
//!
//! One decoder instance per peer connection, fed every inbound message in
//! wire order by a single consumer. The held state is exactly what
//! multi-message events require: the pending zone byte awaiting its port
//! byte, and the last-seen fader MSB per strip. Everything else decodes
//! statelessly, one event per message.
//!
//! Nothing here is fatal. Foreign traffic and out-of-range fields are
//! ignored; desynchronization is logged and recovered from by the next
//! well-formed pair.

use tracing::{debug, trace, warn};

use crate::address::{
    Port, Role, StripControl, Switch, VPot, Zone, FADER_LSB_BASE, FADER_MSB_BASE, PORT_ON_BIT,
    STRIP_COUNT, VPOT_BASE,
};
use crate::display::{LargeDisplaySlice, SmallDisplay, SmallDisplayTarget, TimeDisplay};
use crate::event::{MeterSide, ProtocolEvent, METER_MAX};
use crate::message::{
    HuiMessage, DISPLAY_LARGE, DISPLAY_SMALL, DISPLAY_TIME, PING_HOST, PING_SURFACE,
};

/// Decodes one peer's message stream into protocol events.
///
/// Not safe for concurrent mutation: a single logical connection owns the
/// instance and feeds it serially, in the order messages arrived.
#[derive(Debug)]
pub struct Decoder {
    /// Role of the peer whose stream this decoder consumes.
    sender: Role,
    pending_zone: Option<Zone>,
    fader_msb: [Option<u8>; STRIP_COUNT],
}

impl Decoder {
    pub fn new(sender: Role) -> Self {
        Self {
            sender,
            pending_zone: None,
            fader_msb: [None; STRIP_COUNT],
        }
    }

    #[inline]
    pub fn sender(&self) -> Role {
        self.sender
    }

    /// Clear all pairing state.
    pub fn reset(&mut self) {
        self.pending_zone = None;
        self.fader_msb = [None; STRIP_COUNT];
    }

    /// Decode one message. `None` means the message carried no complete
    /// event: it armed pairing state, or it was foreign/ignored.
    pub fn decode(&mut self, message: &HuiMessage) -> Option<ProtocolEvent> {
        match message {
            HuiMessage::ControlChange { controller, value } => {
                self.decode_control_change(*controller, *value)
            }
            HuiMessage::PolyPressure { note, pressure } => {
                Self::decode_meter(*note, *pressure)
            }
            HuiMessage::SystemExclusive { .. } => self.decode_sysex(message),
        }
    }

    /// Lazily decode a sequence of messages in arrival order.
    pub fn decode_iter<'a, I>(&'a mut self, messages: I) -> impl Iterator<Item = ProtocolEvent> + 'a
    where
        I: IntoIterator<Item = HuiMessage>,
        I::IntoIter: 'a,
    {
        messages
            .into_iter()
            .filter_map(move |message| self.decode(&message))
    }

    fn decode_control_change(&mut self, controller: u8, value: u8) -> Option<ProtocolEvent> {
        if controller == self.sender.zone_select_controller() {
            if let Some(stale) = self.pending_zone.replace(Zone::new(value)) {
                // A stray zone byte without its port pair is simply abandoned.
                debug!(zone = stale.value(), "unresolved zone byte superseded");
            }
            return None;
        }
        if controller == self.sender.port_state_controller() {
            return self.resolve_port(value);
        }

        match controller {
            FADER_MSB_BASE..=0x07 => {
                self.fader_msb[controller as usize] = Some(value);
                None
            }
            FADER_LSB_BASE..=0x27 => {
                let channel = controller - FADER_LSB_BASE;
                match self.fader_msb[channel as usize].take() {
                    Some(msb) => Some(ProtocolEvent::FaderLevel {
                        channel,
                        level: (u16::from(msb) << 7) | u16::from(value),
                    }),
                    None => {
                        warn!(channel, "fader LSB without a buffered MSB; discarding");
                        None
                    }
                }
            }
            VPOT_BASE..=0x18 => VPot::from_index(controller - VPOT_BASE)
                .map(|vpot| ProtocolEvent::VPotValue { vpot, value }),
            _ => {
                trace!(controller, "ignoring unrelated control change");
                None
            }
        }
    }

    fn resolve_port(&mut self, value: u8) -> Option<ProtocolEvent> {
        let Some(zone) = self.pending_zone.take() else {
            warn!(value, "port byte without a pending zone; stream desynchronized");
            return None;
        };
        let port = Port::new(value);
        let on = value & PORT_ON_BIT != 0;
        match Switch::from_address(zone, port) {
            Some(Switch::Strip {
                channel,
                control: StripControl::Fader,
            }) => Some(ProtocolEvent::FaderTouch {
                channel,
                touched: on,
            }),
            Some(switch) => Some(ProtocolEvent::SwitchChanged { switch, on }),
            None => {
                debug!(
                    zone = zone.value(),
                    port = port.value(),
                    "unmapped zone/port combination"
                );
                None
            }
        }
    }

    fn decode_meter(note: u8, pressure: u8) -> Option<ProtocolEvent> {
        if note as usize >= STRIP_COUNT {
            trace!(note, "ignoring pressure message outside the meter range");
            return None;
        }
        Some(ProtocolEvent::MeterLevel {
            channel: note,
            side: MeterSide::from_bit(pressure >> 4),
            level: (pressure & 0x0F).min(METER_MAX),
        })
    }

    fn decode_sysex(&self, message: &HuiMessage) -> Option<ProtocolEvent> {
        let Some(body) = message.protocol_body() else {
            trace!("ignoring foreign system-exclusive traffic");
            return None;
        };
        let (&kind, payload) = body.split_first()?;
        match kind {
            PING_HOST if payload.is_empty() && self.sender == Role::Host => {
                Some(ProtocolEvent::Ping { from: Role::Host })
            }
            PING_SURFACE if payload.is_empty() && self.sender == Role::Surface => {
                Some(ProtocolEvent::Ping {
                    from: Role::Surface,
                })
            }
            DISPLAY_LARGE => {
                let (&index, chars) = payload.split_first()?;
                if index as usize >= crate::display::LARGE_SLICE_COUNT {
                    debug!(index, "large display slice index out of range");
                    return None;
                }
                Some(ProtocolEvent::LargeDisplayUpdated(
                    LargeDisplaySlice::from_payload(index, chars),
                ))
            }
            DISPLAY_TIME => Some(ProtocolEvent::TimeDisplayUpdated(
                TimeDisplay::from_wire_bytes(payload),
            )),
            DISPLAY_SMALL => {
                let (&id, chars) = payload.split_first()?;
                let target = SmallDisplayTarget::from_id(id)?;
                Some(ProtocolEvent::SmallDisplayUpdated(
                    SmallDisplay::from_payload(target, chars),
                ))
            }
            _ => {
                trace!(kind, "ignoring unknown protocol message type");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::TransportControl;
    use crate::encode::Encoder;

    fn decode_all(decoder: &mut Decoder, messages: &[HuiMessage]) -> Vec<ProtocolEvent> {
        messages
            .iter()
            .filter_map(|message| decoder.decode(message))
            .collect()
    }

    #[test]
    fn test_switch_pairing() {
        let encoder = Encoder::new(Role::Surface);
        let mut decoder = Decoder::new(Role::Surface);
        let events = decode_all(
            &mut decoder,
            &encoder.switch(Switch::Transport(TransportControl::Record), true),
        );
        assert_eq!(
            events,
            vec![ProtocolEvent::SwitchChanged {
                switch: Switch::Transport(TransportControl::Record),
                on: true,
            }]
        );
    }

    #[test]
    fn test_port_without_zone_is_discarded() {
        let mut decoder = Decoder::new(Role::Host);
        let port = HuiMessage::control_change(Role::Host.port_state_controller(), 0x42);
        assert_eq!(decoder.decode(&port), None);

        // The stream recovers with the next well-formed pair.
        let zone = HuiMessage::control_change(Role::Host.zone_select_controller(), 0x0E);
        assert_eq!(decoder.decode(&zone), None);
        assert_eq!(
            decoder.decode(&port),
            Some(ProtocolEvent::SwitchChanged {
                switch: Switch::Transport(TransportControl::FastForward),
                on: true,
            })
        );
    }

    #[test]
    fn test_new_zone_supersedes_unresolved_one() {
        let mut decoder = Decoder::new(Role::Host);
        let zone = Role::Host.zone_select_controller();
        let port = Role::Host.port_state_controller();
        decoder.decode(&HuiMessage::control_change(zone, 0x00));
        decoder.decode(&HuiMessage::control_change(zone, 0x01));
        let event = decoder.decode(&HuiMessage::control_change(port, 0x02 | 0x40));
        assert_eq!(
            event,
            Some(ProtocolEvent::SwitchChanged {
                switch: Switch::Strip {
                    channel: 1,
                    control: StripControl::Mute,
                },
                on: true,
            })
        );
    }

    #[test]
    fn test_unmapped_address_emits_nothing_but_clears_state() {
        let mut decoder = Decoder::new(Role::Host);
        let zone = Role::Host.zone_select_controller();
        let port = Role::Host.port_state_controller();
        decoder.decode(&HuiMessage::control_change(zone, 0x7F));
        assert_eq!(decoder.decode(&HuiMessage::control_change(port, 0x00)), None);
        // State is idle again: a lone port byte is a desync, not a pair.
        assert_eq!(decoder.decode(&HuiMessage::control_change(port, 0x00)), None);
    }

    #[test]
    fn test_fader_touch_resolves_from_strip_fader_port() {
        let encoder = Encoder::new(Role::Surface);
        let mut decoder = Decoder::new(Role::Surface);
        let events = decode_all(&mut decoder, &encoder.fader_touch(5, true));
        assert_eq!(
            events,
            vec![ProtocolEvent::FaderTouch {
                channel: 5,
                touched: true,
            }]
        );
    }

    #[test]
    fn test_fader_level_combines_halves() {
        let mut decoder = Decoder::new(Role::Host);
        assert_eq!(
            decoder.decode(&HuiMessage::control_change(0x02, 0x24)),
            None
        );
        assert_eq!(
            decoder.decode(&HuiMessage::control_change(0x22, 0x34)),
            Some(ProtocolEvent::FaderLevel {
                channel: 2,
                level: 0x1234,
            })
        );
    }

    #[test]
    fn test_fader_lsb_without_msb_is_discarded() {
        let mut decoder = Decoder::new(Role::Host);
        assert_eq!(
            decoder.decode(&HuiMessage::control_change(0x22, 0x34)),
            None
        );
        // The MSB buffer is consumed on emission, so a repeated LSB alone
        // yields nothing either.
        decoder.decode(&HuiMessage::control_change(0x02, 0x01));
        assert!(decoder
            .decode(&HuiMessage::control_change(0x22, 0x00))
            .is_some());
        assert_eq!(
            decoder.decode(&HuiMessage::control_change(0x22, 0x00)),
            None
        );
    }

    #[test]
    fn test_vpot_value() {
        let mut decoder = Decoder::new(Role::Surface);
        assert_eq!(
            decoder.decode(&HuiMessage::control_change(0x13, 0x42)),
            Some(ProtocolEvent::VPotValue {
                vpot: VPot::Strip(3),
                value: 0x42,
            })
        );
    }

    #[test]
    fn test_meter_decode_clamps_level() {
        let mut decoder = Decoder::new(Role::Host);
        assert_eq!(
            decoder.decode(&HuiMessage::poly_pressure(1, 0x1F)),
            Some(ProtocolEvent::MeterLevel {
                channel: 1,
                side: MeterSide::Right,
                level: METER_MAX,
            })
        );
        // Note numbers outside the strip range have no meaning here.
        assert_eq!(decoder.decode(&HuiMessage::poly_pressure(9, 0x05)), None);
    }

    #[test]
    fn test_slice_decode_is_stateless_and_idempotent() {
        let encoder = Encoder::new(Role::Host);
        let mut decoder = Decoder::new(Role::Host);
        let message = &encoder.large_display(&[LargeDisplaySlice::new(4, "take 2")])[0];
        let first = decoder.decode(message);
        let second = decoder.decode(message);
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_ping_matches_sender_constant_only() {
        let mut host_stream = Decoder::new(Role::Host);
        let host_ping = Encoder::new(Role::Host).ping();
        let surface_ping = Encoder::new(Role::Surface).ping();

        assert_eq!(
            host_stream.decode(&host_ping),
            Some(ProtocolEvent::Ping { from: Role::Host })
        );
        assert_eq!(host_stream.decode(&surface_ping), None);
    }

    #[test]
    fn test_foreign_traffic_is_ignored() {
        let mut decoder = Decoder::new(Role::Host);
        let foreign = [
            HuiMessage::control_change(0x50, 0x10),
            HuiMessage::SystemExclusive {
                data: vec![0x7E, 0x7F, 0x06, 0x01],
            },
            HuiMessage::SystemExclusive { data: vec![] },
        ];
        for message in &foreign {
            assert_eq!(decoder.decode(message), None);
        }
    }

    #[test]
    fn test_reset_clears_pairing_state() {
        let mut decoder = Decoder::new(Role::Host);
        decoder.decode(&HuiMessage::control_change(
            Role::Host.zone_select_controller(),
            0x03,
        ));
        decoder.decode(&HuiMessage::control_change(0x00, 0x7F));
        decoder.reset();
        assert_eq!(
            decoder.decode(&HuiMessage::control_change(
                Role::Host.port_state_controller(),
                0x41,
            )),
            None
        );
        assert_eq!(decoder.decode(&HuiMessage::control_change(0x20, 0x00)), None);
    }

    #[test]
    fn test_decode_iter_is_lazy_over_arrival_order() {
        let encoder = Encoder::new(Role::Host);
        let mut messages: Vec<HuiMessage> = Vec::new();
        messages.extend(encoder.switch(Switch::Cursor(crate::address::CursorControl::Up), true));
        messages.extend(encoder.fader_level(0, 16383));
        let mut decoder = Decoder::new(Role::Host);
        let events: Vec<_> = decoder.decode_iter(messages).collect();
        assert_eq!(events.len(), 2);
    }
}
