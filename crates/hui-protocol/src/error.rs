//! Error types for the protocol engine.
//!
//! Only the raw-byte boundary is fallible. Decode-side conditions
//! (desynchronization, foreign traffic, out-of-range fields) are not errors;
//! the decoder reports them as absent events and log lines.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("truncated MIDI message ({0} bytes)")]
    Truncated(usize),

    #[error("unsupported status byte: {0:#04x}")]
    UnsupportedStatus(u8),

    #[error("unterminated system-exclusive message")]
    UnterminatedSysEx,
}

pub type Result<T> = std::result::Result<T, Error>;
