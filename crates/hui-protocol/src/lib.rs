//! HUI control-surface protocol engine.
//!
//! Bidirectional mapping between typed protocol events and the exact MIDI
//! byte sequences of the HUI wire format: zone/port switch addressing,
//! 14-bit fader positions, v-pot values, stereo meters, the three display
//! classes, and the liveness ping.
//!
//! The engine is synchronous and CPU-bound. Encoding is pure; the
//! [`Decoder`] and [`PingMonitor`] hold per-connection state and must be
//! driven by a single consumer. Transport and scheduling live elsewhere
//! (see the `hui-io` crate).

pub mod error;
pub use error::{Error, Result};

mod address;
pub use address::{
    CursorControl, FunctionKey, Port, Role, StripControl, Switch, TransportControl, VPot, Zone,
    STRIP_COUNT,
};

mod display;
pub use display::{
    decode_byte, encode_char, LargeDisplaySlice, SmallDisplay, SmallDisplayTarget, TimeDigit,
    TimeDisplay, LARGE_SLICE_COUNT, LARGE_SLICE_LEN, SMALL_DISPLAY_LEN, TIME_DISPLAY_LEN,
};

mod message;
pub use message::{HuiMessage, MANUFACTURER_ID, SYSEX_SUB_ID};

mod event;
pub use event::{MeterSide, ProtocolEvent, METER_MAX};

mod encode;
pub use encode::{EncodedMessages, Encoder};

mod decode;
pub use decode::Decoder;

mod ping;
pub use ping::PingMonitor;
