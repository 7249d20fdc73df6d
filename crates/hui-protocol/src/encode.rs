//! Outbound message construction.
//!
//! Every operation is a pure function from a state fragment to the MIDI
//! messages that carry it. Out-of-range inputs are clamped or truncated
//! silently: a bad display string or meter value must never block other
//! protocol traffic.

use smallvec::{smallvec, SmallVec};

use crate::address::{
    Port, Role, StripControl, Switch, VPot, Zone, FADER_LSB_BASE, FADER_MSB_BASE, PORT_ON_BIT,
    VPOT_BASE,
};
use crate::display::{LargeDisplaySlice, SmallDisplay, TimeDisplay};
use crate::event::{MeterSide, METER_MAX};
use crate::message::{HuiMessage, DISPLAY_LARGE, DISPLAY_SMALL, DISPLAY_TIME, PING_HOST, PING_SURFACE};

/// Encoder output: at most eight messages (a full large-display update),
/// stack-allocated.
pub type EncodedMessages = SmallVec<[HuiMessage; 8]>;

/// Builds outbound protocol events into MIDI messages for one sender role.
#[derive(Clone, Copy, Debug)]
pub struct Encoder {
    role: Role,
}

impl Encoder {
    #[inline]
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// A switch state change: zone-select CC followed by the port CC.
    ///
    /// The order is significant; the zone byte arms the receiver for the
    /// port byte that follows.
    pub fn switch(&self, switch: Switch, on: bool) -> EncodedMessages {
        let (zone, port) = switch.address();
        self.zone_port_pair(zone, port, on)
    }

    /// A 14-bit fader position as MSB/LSB control changes.
    pub fn fader_level(&self, channel: u8, level: u16) -> EncodedMessages {
        let channel = channel.min(7);
        let level = level.min(0x3FFF);
        smallvec![
            HuiMessage::control_change(FADER_MSB_BASE + channel, (level >> 7) as u8),
            HuiMessage::control_change(FADER_LSB_BASE + channel, (level & 0x7F) as u8),
        ]
    }

    /// Fader touch/release, reusing the switch pairing with the strip's
    /// fader port.
    pub fn fader_touch(&self, channel: u8, touched: bool) -> EncodedMessages {
        self.switch(
            Switch::Strip {
                channel: channel.min(7),
                control: StripControl::Fader,
            },
            touched,
        )
    }

    /// A raw 7-bit v-pot value on the pot's dedicated controller.
    pub fn vpot(&self, vpot: VPot, value: u8) -> EncodedMessages {
        smallvec![HuiMessage::control_change(VPOT_BASE + vpot.index(), value)]
    }

    /// A stereo meter reading; level clamps to [`METER_MAX`].
    pub fn meter(&self, channel: u8, side: MeterSide, level: u8) -> EncodedMessages {
        let packed = (side.bit() << 4) | level.min(METER_MAX);
        smallvec![HuiMessage::poly_pressure(channel.min(7), packed)]
    }

    /// One SysEx message per slice. Slices are sorted by index for
    /// deterministic output; receivers accept any order.
    pub fn large_display(&self, slices: &[LargeDisplaySlice]) -> EncodedMessages {
        let mut ordered: SmallVec<[LargeDisplaySlice; 8]> = slices.iter().copied().collect();
        ordered.sort_by_key(|slice| slice.index());
        ordered
            .iter()
            .map(|slice| {
                let payload = slice.payload();
                let mut body = [0u8; 12];
                body[0] = DISPLAY_LARGE;
                body[1] = slice.index();
                body[2..].copy_from_slice(&payload);
                HuiMessage::protocol_sysex(&body)
            })
            .collect()
    }

    /// The time display, rightmost digit first on the wire.
    pub fn time_display(&self, display: &TimeDisplay) -> EncodedMessages {
        let wire = display.wire_bytes();
        let mut body = [0u8; 9];
        body[0] = DISPLAY_TIME;
        body[1..].copy_from_slice(&wire);
        smallvec![HuiMessage::protocol_sysex(&body)]
    }

    /// A 4-character small display update.
    pub fn small_display(&self, display: &SmallDisplay) -> EncodedMessages {
        let payload = display.payload();
        let mut body = [0u8; 6];
        body[0] = DISPLAY_SMALL;
        body[1] = display.target().id();
        body[2..].copy_from_slice(&payload);
        smallvec![HuiMessage::protocol_sysex(&body)]
    }

    /// This role's constant liveness ping.
    pub fn ping(&self) -> HuiMessage {
        let kind = match self.role {
            Role::Host => PING_HOST,
            Role::Surface => PING_SURFACE,
        };
        HuiMessage::protocol_sysex(&[kind])
    }

    fn zone_port_pair(&self, zone: Zone, port: Port, on: bool) -> EncodedMessages {
        let state = port.value() | if on { PORT_ON_BIT } else { 0 };
        smallvec![
            HuiMessage::control_change(self.role.zone_select_controller(), zone.value()),
            HuiMessage::control_change(self.role.port_state_controller(), state),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::TransportControl;
    use crate::display::SmallDisplayTarget;

    #[test]
    fn test_switch_emits_zone_then_port() {
        let encoder = Encoder::new(Role::Surface);
        let messages = encoder.switch(Switch::Transport(TransportControl::Play), true);
        assert_eq!(
            messages.as_slice(),
            &[
                HuiMessage::control_change(0x0F, 0x0E),
                HuiMessage::control_change(0x2F, 0x44),
            ]
        );
    }

    #[test]
    fn test_switch_off_clears_state_bit() {
        let encoder = Encoder::new(Role::Host);
        let messages = encoder.switch(
            Switch::Strip {
                channel: 2,
                control: StripControl::Mute,
            },
            false,
        );
        assert_eq!(
            messages.as_slice(),
            &[
                HuiMessage::control_change(0x0C, 0x02),
                HuiMessage::control_change(0x2C, 0x02),
            ]
        );
    }

    #[test]
    fn test_fader_level_split() {
        let encoder = Encoder::new(Role::Host);
        let messages = encoder.fader_level(3, 0x1234);
        assert_eq!(
            messages.as_slice(),
            &[
                HuiMessage::control_change(0x03, 0x24),
                HuiMessage::control_change(0x23, 0x34),
            ]
        );
    }

    #[test]
    fn test_fader_level_clamped_to_14_bits() {
        let encoder = Encoder::new(Role::Host);
        assert_eq!(encoder.fader_level(0, u16::MAX), encoder.fader_level(0, 0x3FFF));
    }

    #[test]
    fn test_vpot_controller_offset() {
        let encoder = Encoder::new(Role::Surface);
        let messages = encoder.vpot(VPot::Master, 0x41);
        assert_eq!(
            messages.as_slice(),
            &[HuiMessage::control_change(0x18, 0x41)]
        );
    }

    #[test]
    fn test_meter_packs_side_and_clamps_level() {
        let encoder = Encoder::new(Role::Host);
        let over = encoder.meter(2, MeterSide::Left, 20);
        let clipped = encoder.meter(2, MeterSide::Left, METER_MAX);
        assert_eq!(over, clipped);

        let right = encoder.meter(2, MeterSide::Right, 5);
        assert_eq!(
            right.as_slice(),
            &[HuiMessage::poly_pressure(2, 0x15)]
        );
    }

    #[test]
    fn test_large_display_sorted_by_index() {
        let encoder = Encoder::new(Role::Host);
        let slices = [
            LargeDisplaySlice::new(7, "seven"),
            LargeDisplaySlice::new(0, "zero"),
            LargeDisplaySlice::new(3, "three"),
        ];
        let messages = encoder.large_display(&slices);
        assert_eq!(messages.len(), 3);
        let indices: Vec<u8> = messages
            .iter()
            .map(|m| match m {
                HuiMessage::SystemExclusive { data } => data[6],
                _ => panic!("expected SysEx"),
            })
            .collect();
        assert_eq!(indices, vec![0, 3, 7]);
    }

    #[test]
    fn test_small_display_body() {
        let encoder = Encoder::new(Role::Host);
        let messages =
            encoder.small_display(&SmallDisplay::new(SmallDisplayTarget::Strip(4), "Bass"));
        assert_eq!(
            messages[0].to_bytes(),
            vec![0xF0, 0x00, 0x00, 0x66, 0x05, 0x00, 0x10, 4, b'B', b'a', b's', b's', 0xF7]
        );
    }

    #[test]
    fn test_ping_constants_differ_by_role() {
        let host = Encoder::new(Role::Host).ping();
        let surface = Encoder::new(Role::Surface).ping();
        assert_ne!(host, surface);
        assert_eq!(host.to_bytes(), vec![0xF0, 0x00, 0x00, 0x66, 0x05, 0x00, 0x00, 0xF7]);
    }
}
