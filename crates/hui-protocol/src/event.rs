//! Fully-resolved protocol events, as produced by the decoder.

use serde::{Deserialize, Serialize};

use crate::address::{Role, Switch, VPot};
use crate::display::{LargeDisplaySlice, SmallDisplay, TimeDisplay};

/// Highest level-meter value; also the clip indicator.
pub const METER_MAX: u8 = 12;

/// Which side of a stereo meter pair a reading addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeterSide {
    Left,
    Right,
}

impl MeterSide {
    #[inline]
    pub(crate) fn bit(self) -> u8 {
        match self {
            MeterSide::Left => 0,
            MeterSide::Right => 1,
        }
    }

    #[inline]
    pub(crate) fn from_bit(bit: u8) -> MeterSide {
        if bit & 1 == 0 {
            MeterSide::Left
        } else {
            MeterSide::Right
        }
    }
}

/// One decoded unit of protocol meaning.
///
/// Every variant is fully resolved: multi-message pairing and half-value
/// buffering happen inside the decoder, never in the consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// A switch was pressed/released (surface to host) or an LED was set
    /// (host to surface).
    SwitchChanged { switch: Switch, on: bool },
    /// A complete 14-bit fader position.
    FaderLevel { channel: u8, level: u16 },
    /// The fader's touch sensor changed state.
    FaderTouch { channel: u8, touched: bool },
    /// Raw 7-bit v-pot value: a signed delta from the surface, an LED-ring
    /// preset index from the host.
    VPotValue { vpot: VPot, value: u8 },
    /// A stereo meter reading, level already clamped to `METER_MAX`.
    MeterLevel {
        channel: u8,
        side: MeterSide,
        level: u8,
    },
    /// One independent slice of the large display.
    LargeDisplayUpdated(LargeDisplaySlice),
    TimeDisplayUpdated(TimeDisplay),
    SmallDisplayUpdated(SmallDisplay),
    /// The peer's liveness ping.
    Ping { from: Role },
}
