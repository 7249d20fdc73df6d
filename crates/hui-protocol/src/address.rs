//! Zone/port addressing and the static switch table.
//!
//! Every named switch on the surface maps to exactly one `(Zone, Port)` pair
//! and back. The table is a pair of total `match` functions, so both lookups
//! are O(1) with no allocation.

use serde::{Deserialize, Serialize};

/// Number of channel strips on the surface.
pub const STRIP_COUNT: usize = 8;

/// Zone value of the transport key group.
const TRANSPORT_ZONE: u8 = 0x0E;
/// Zone value of the cursor key group.
const CURSOR_ZONE: u8 = 0x13;
/// Zone value of the function key row.
const FUNCTION_ZONE: u8 = 0x18;

/// Which peer is sending a given message.
///
/// Several controller numbers differ by direction, so encoders and decoders
/// are parameterized by the sender's role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The DAW side of the link.
    Host,
    /// The control panel side of the link.
    Surface,
}

impl Role {
    /// The other end of the link.
    #[inline]
    pub fn peer(self) -> Role {
        match self {
            Role::Host => Role::Surface,
            Role::Surface => Role::Host,
        }
    }

    /// Controller number of the zone-select CC for messages sent by this role.
    #[inline]
    pub fn zone_select_controller(self) -> u8 {
        match self {
            Role::Host => 0x0C,
            Role::Surface => 0x0F,
        }
    }

    /// Controller number of the port on/off CC for messages sent by this role.
    #[inline]
    pub fn port_state_controller(self) -> u8 {
        match self {
            Role::Host => 0x2C,
            Role::Surface => 0x2F,
        }
    }
}

/// Coarse address group (7-bit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Zone(u8);

impl Zone {
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value & 0x7F)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Sub-address within a zone (3-bit). The on/off bit is packed next to it on
/// the wire but is not part of the port identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(u8);

impl Port {
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value & 0x07)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Bit set on the port byte when the switch/LED is on (or the fader touched).
pub(crate) const PORT_ON_BIT: u8 = 0x40;

/// First controller number of the fader MSB range (one CC per strip).
pub(crate) const FADER_MSB_BASE: u8 = 0x00;
/// First controller number of the fader LSB range.
pub(crate) const FADER_LSB_BASE: u8 = 0x20;
/// First controller number of the v-pot range.
pub(crate) const VPOT_BASE: u8 = 0x10;

/// Per-strip control, addressed by port within the strip's zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StripControl {
    /// Touch sensor of the motorized fader.
    Fader,
    Select,
    Mute,
    Solo,
    Auto,
    VSel,
    Insert,
    RecordReady,
}

impl StripControl {
    pub const ALL: [StripControl; 8] = [
        StripControl::Fader,
        StripControl::Select,
        StripControl::Mute,
        StripControl::Solo,
        StripControl::Auto,
        StripControl::VSel,
        StripControl::Insert,
        StripControl::RecordReady,
    ];

    #[inline]
    fn port(self) -> Port {
        Port::new(match self {
            StripControl::Fader => 0,
            StripControl::Select => 1,
            StripControl::Mute => 2,
            StripControl::Solo => 3,
            StripControl::Auto => 4,
            StripControl::VSel => 5,
            StripControl::Insert => 6,
            StripControl::RecordReady => 7,
        })
    }

    #[inline]
    fn from_port(port: Port) -> StripControl {
        // Port is 3-bit, so this is total.
        Self::ALL[port.value() as usize]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportControl {
    Talkback,
    Rewind,
    FastForward,
    Stop,
    Play,
    Record,
}

impl TransportControl {
    pub const ALL: [TransportControl; 6] = [
        TransportControl::Talkback,
        TransportControl::Rewind,
        TransportControl::FastForward,
        TransportControl::Stop,
        TransportControl::Play,
        TransportControl::Record,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorControl {
    Down,
    Left,
    Mode,
    Right,
    Up,
}

impl CursorControl {
    pub const ALL: [CursorControl; 5] = [
        CursorControl::Down,
        CursorControl::Left,
        CursorControl::Mode,
        CursorControl::Right,
        CursorControl::Up,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
}

impl FunctionKey {
    pub const ALL: [FunctionKey; 8] = [
        FunctionKey::F1,
        FunctionKey::F2,
        FunctionKey::F3,
        FunctionKey::F4,
        FunctionKey::F5,
        FunctionKey::F6,
        FunctionKey::F7,
        FunctionKey::F8,
    ];
}

/// A named switch on the surface.
///
/// The set of variants *is* the device map: strips occupy zones
/// `0x00..=0x07`, transport keys zone `0x0E`, cursor keys zone `0x13`, and
/// function keys zone `0x18`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Switch {
    Strip { channel: u8, control: StripControl },
    Transport(TransportControl),
    Cursor(CursorControl),
    Function(FunctionKey),
}

impl Switch {
    /// The switch's fixed `(Zone, Port)` address.
    pub fn address(self) -> (Zone, Port) {
        match self {
            Switch::Strip { channel, control } => (Zone::new(channel & 0x07), control.port()),
            Switch::Transport(control) => {
                let port = match control {
                    TransportControl::Talkback => 0,
                    TransportControl::Rewind => 1,
                    TransportControl::FastForward => 2,
                    TransportControl::Stop => 3,
                    TransportControl::Play => 4,
                    TransportControl::Record => 5,
                };
                (Zone::new(TRANSPORT_ZONE), Port::new(port))
            }
            Switch::Cursor(control) => {
                let port = match control {
                    CursorControl::Down => 0,
                    CursorControl::Left => 1,
                    CursorControl::Mode => 2,
                    CursorControl::Right => 3,
                    CursorControl::Up => 4,
                };
                (Zone::new(CURSOR_ZONE), Port::new(port))
            }
            Switch::Function(key) => {
                let port = match key {
                    FunctionKey::F1 => 0,
                    FunctionKey::F2 => 1,
                    FunctionKey::F3 => 2,
                    FunctionKey::F4 => 3,
                    FunctionKey::F5 => 4,
                    FunctionKey::F6 => 5,
                    FunctionKey::F7 => 6,
                    FunctionKey::F8 => 7,
                };
                (Zone::new(FUNCTION_ZONE), Port::new(port))
            }
        }
    }

    /// Reverse lookup. `None` for combinations not present in the table;
    /// those are valid on the wire (reserved controls) and must not abort
    /// decoding.
    pub fn from_address(zone: Zone, port: Port) -> Option<Switch> {
        match (zone.value(), port.value()) {
            (channel @ 0x00..=0x07, _) => Some(Switch::Strip {
                channel,
                control: StripControl::from_port(port),
            }),
            (TRANSPORT_ZONE, p) => TransportControl::ALL
                .get(p as usize)
                .copied()
                .map(Switch::Transport),
            (CURSOR_ZONE, p) => CursorControl::ALL
                .get(p as usize)
                .copied()
                .map(Switch::Cursor),
            (FUNCTION_ZONE, p) => FunctionKey::ALL
                .get(p as usize)
                .copied()
                .map(Switch::Function),
            _ => None,
        }
    }

    /// Iterate over every switch in the table.
    pub fn all() -> impl Iterator<Item = Switch> {
        let strips = (0..STRIP_COUNT as u8).flat_map(|channel| {
            StripControl::ALL
                .iter()
                .map(move |&control| Switch::Strip { channel, control })
        });
        let transport = TransportControl::ALL.iter().copied().map(Switch::Transport);
        let cursor = CursorControl::ALL.iter().copied().map(Switch::Cursor);
        let function = FunctionKey::ALL.iter().copied().map(Switch::Function);
        strips.chain(transport).chain(cursor).chain(function)
    }
}

/// A rotary encoder: one per strip plus the master wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VPot {
    Strip(u8),
    Master,
}

impl VPot {
    /// Wire index, 0-7 for strips and 8 for the master wheel.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            VPot::Strip(channel) => channel & 0x07,
            VPot::Master => 8,
        }
    }

    #[inline]
    pub fn from_index(index: u8) -> Option<VPot> {
        match index {
            0..=7 => Some(VPot::Strip(index)),
            8 => Some(VPot::Master),
            _ => None,
        }
    }
}
