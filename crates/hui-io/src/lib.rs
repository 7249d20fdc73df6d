//! Runtime layer for the HUI protocol engine.
//!
//! Provides the per-connection event pump, the mirrored surface-state
//! model, and hardware MIDI I/O.
//!
//! Feature gates: `midi-io` (hardware I/O via midir).

pub mod error;
pub use error::{Error, Result};

mod connection;
pub use connection::{ConnectionConfig, HuiConnection};

mod state;
pub use state::{LargeDisplayModel, SurfaceState, LARGE_DISPLAY_COLS, LARGE_DISPLAY_ROWS};

#[cfg(feature = "midi-io")]
pub(crate) mod io;

#[cfg(feature = "midi-io")]
pub use io::{MidiInputDevice, MidiInputManager, MidiOutputDevice, MidiOutputManager};
