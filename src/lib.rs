//! # HUI - Control-Surface Protocol Engine
//!
//! Umbrella crate coordinating two subsystems:
//! - **hui-protocol** - The protocol engine: zone/port addressing, display
//!   encoding, message encoder/decoder state machine, ping liveness
//! - **hui-io** - The runtime layer: connection event pump, mirrored
//!   surface state, hardware MIDI I/O (midir)
//!
//! ## Quick Start
//!
//! ```no_run
//! use hui::prelude::*;
//!
//! // One connection per peer link; this process plays the host.
//! let mut connection = HuiConnection::new(ConnectionConfig {
//!     role: Role::Host,
//!     ..ConnectionConfig::default()
//! });
//!
//! // Light the record-ready LED on strip 3.
//! connection.send_switch(
//!     Switch::Strip { channel: 3, control: StripControl::RecordReady },
//!     true,
//! );
//!
//! // Feed inbound wire bytes; decoded events appear on the channel.
//! connection.feed_bytes(&[0xB0, 0x0F, 0x00]);
//! for event in connection.events().try_iter() {
//!     println!("{:?}", event);
//! }
//!
//! // Drive liveness from any timer.
//! let alive = connection.tick();
//! # let _ = alive;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Protocol engine plus hardware MIDI I/O
//! - `midi-io` - midir-backed input/output managers

/// Re-export of the protocol engine for direct access
pub use hui_protocol as protocol;

/// Re-export of the runtime layer for direct access
pub use hui_io as io;

// Protocol engine types
pub use hui_protocol::{
    decode_byte,
    encode_char,
    CursorControl,
    Decoder,
    EncodedMessages,
    Encoder,
    FunctionKey,
    HuiMessage,
    LargeDisplaySlice,
    MeterSide,
    PingMonitor,
    Port,
    ProtocolEvent,
    Role,
    SmallDisplay,
    SmallDisplayTarget,
    StripControl,
    Switch,
    TimeDigit,
    TimeDisplay,
    TransportControl,
    VPot,
    Zone,
    METER_MAX,
    STRIP_COUNT,
};

// Runtime layer types
pub use hui_io::{ConnectionConfig, HuiConnection, LargeDisplayModel, SurfaceState};

#[cfg(feature = "midi-io")]
pub use hui_io::{MidiInputDevice, MidiInputManager, MidiOutputDevice, MidiOutputManager};

pub mod prelude {
    //! Common imports for working with a HUI link.

    pub use crate::{
        ConnectionConfig, Decoder, Encoder, HuiConnection, HuiMessage, LargeDisplaySlice,
        MeterSide, PingMonitor, ProtocolEvent, Role, SmallDisplay, SmallDisplayTarget,
        StripControl, SurfaceState, Switch, TimeDisplay, TransportControl, VPot,
    };

    #[cfg(feature = "midi-io")]
    pub use crate::{MidiInputManager, MidiOutputManager};
}
