//! Display character encoding and the three display payload types.
//!
//! All display text travels as 7-bit bytes from the protocol's character
//! table. Encoding is total: characters outside the supported set become the
//! blank byte, so display updates can never block protocol traffic.

use std::fmt;

/// Characters per large-display slice.
pub const LARGE_SLICE_LEN: usize = 10;
/// Slices in the full 2x40 large display.
pub const LARGE_SLICE_COUNT: usize = 8;
/// Positions on the time display.
pub const TIME_DISPLAY_LEN: usize = 8;
/// Characters per small display.
pub const SMALL_DISPLAY_LEN: usize = 4;

/// Byte substituted for characters outside the supported set.
const BLANK: u8 = 0x20;
/// Low nibble of a blank time-display position.
const TIME_BLANK: u8 = 0x0F;
/// Dot bit on a time-display byte.
const TIME_DOT_BIT: u8 = 0x10;

/// Encode one character. Total: anything outside `' '..='~'` becomes blank.
#[inline]
pub fn encode_char(c: char) -> u8 {
    if (' '..='~').contains(&c) {
        c as u8
    } else {
        BLANK
    }
}

/// Decode one byte. Unmapped bytes decode to a space.
#[inline]
pub fn decode_byte(byte: u8) -> char {
    if (0x20..=0x7E).contains(&byte) {
        byte as char
    } else {
        ' '
    }
}

fn encode_into(buf: &mut [u8], text: &str) {
    for (slot, c) in buf.iter_mut().zip(text.chars()) {
        *slot = encode_char(c);
    }
}

fn decode_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| decode_byte(b)).collect()
}

/// One 10-character chunk of the 2x40 large display.
///
/// Slices are independently transmittable and decodable; a full display
/// update is just several of these, in any order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LargeDisplaySlice {
    index: u8,
    text: [u8; LARGE_SLICE_LEN],
}

impl LargeDisplaySlice {
    /// Build a slice from text. The index is clamped to the valid range and
    /// text is padded or truncated to 10 characters.
    pub fn new(index: u8, text: &str) -> Self {
        let mut buf = [BLANK; LARGE_SLICE_LEN];
        encode_into(&mut buf, text);
        Self {
            index: index.min(LARGE_SLICE_COUNT as u8 - 1),
            text: buf,
        }
    }

    #[inline]
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The slice text, decoded.
    pub fn text(&self) -> String {
        decode_to_string(&self.text)
    }

    pub(crate) fn from_payload(index: u8, payload: &[u8]) -> Self {
        let mut buf = [BLANK; LARGE_SLICE_LEN];
        for (slot, &b) in buf.iter_mut().zip(payload) {
            *slot = b & 0x7F;
        }
        Self {
            index: index.min(LARGE_SLICE_COUNT as u8 - 1),
            text: buf,
        }
    }

    pub(crate) fn payload(&self) -> [u8; LARGE_SLICE_LEN] {
        self.text
    }
}

/// One position of the time display: an optional digit plus its dot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeDigit {
    /// `None` renders as blank.
    pub digit: Option<u8>,
    pub dot: bool,
}

impl TimeDigit {
    pub const BLANK: TimeDigit = TimeDigit {
        digit: None,
        dot: false,
    };

    pub fn new(digit: u8, dot: bool) -> Self {
        Self {
            digit: Some(digit.min(9)),
            dot,
        }
    }

    fn to_wire(self) -> u8 {
        let value = match self.digit {
            Some(d) if d <= 9 => d,
            _ => TIME_BLANK,
        };
        value | if self.dot { TIME_DOT_BIT } else { 0 }
    }

    fn from_wire(byte: u8) -> Self {
        let value = byte & 0x0F;
        Self {
            digit: (value <= 9).then_some(value),
            dot: byte & TIME_DOT_BIT != 0,
        }
    }
}

/// The 8-position time display, stored left-to-right.
///
/// The wire transmits positions right-to-left (least significant first);
/// that reversal is confined to the codec and undone on decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeDisplay {
    digits: [TimeDigit; TIME_DISPLAY_LEN],
}

impl TimeDisplay {
    /// Build from left-to-right positions. Short inputs are right-aligned
    /// (partial updates address the rightmost positions); inputs longer than
    /// eight keep the rightmost eight, silently.
    pub fn new(digits: &[TimeDigit]) -> Self {
        let keep = if digits.len() > TIME_DISPLAY_LEN {
            &digits[digits.len() - TIME_DISPLAY_LEN..]
        } else {
            digits
        };
        let mut out = [TimeDigit::BLANK; TIME_DISPLAY_LEN];
        let offset = TIME_DISPLAY_LEN - keep.len();
        for (slot, digit) in out[offset..].iter_mut().zip(keep) {
            *slot = *digit;
        }
        Self { digits: out }
    }

    /// Parse from text: digits become positions, `.` or `:` attach a dot to
    /// the preceding digit, anything else becomes a blank position.
    pub fn parse(text: &str) -> Self {
        let mut digits: Vec<TimeDigit> = Vec::new();
        for c in text.chars() {
            match c {
                '0'..='9' => digits.push(TimeDigit::new(c as u8 - b'0', false)),
                '.' | ':' => {
                    if let Some(last) = digits.last_mut() {
                        last.dot = true;
                    }
                }
                _ => digits.push(TimeDigit::BLANK),
            }
        }
        Self::new(&digits)
    }

    #[inline]
    pub fn digits(&self) -> &[TimeDigit; TIME_DISPLAY_LEN] {
        &self.digits
    }

    /// Wire payload: positions reversed so the rightmost digit goes first.
    pub(crate) fn wire_bytes(&self) -> [u8; TIME_DISPLAY_LEN] {
        let mut out = [0u8; TIME_DISPLAY_LEN];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.digits[TIME_DISPLAY_LEN - 1 - i].to_wire();
        }
        out
    }

    /// Restore from a wire payload. Short payloads update the rightmost
    /// positions only; extra bytes beyond eight are ignored.
    pub(crate) fn from_wire_bytes(payload: &[u8]) -> Self {
        let mut digits = [TimeDigit::BLANK; TIME_DISPLAY_LEN];
        for (i, &byte) in payload.iter().take(TIME_DISPLAY_LEN).enumerate() {
            digits[TIME_DISPLAY_LEN - 1 - i] = TimeDigit::from_wire(byte);
        }
        Self { digits }
    }
}

impl fmt::Display for TimeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in &self.digits {
            match digit.digit {
                Some(d) => write!(f, "{}", d)?,
                None => write!(f, " ")?,
            }
            if digit.dot {
                write!(f, ".")?;
            }
        }
        Ok(())
    }
}

/// Which small display a 4-character update addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SmallDisplayTarget {
    /// The scribble strip above a channel.
    Strip(u8),
    /// The select-assign readout in the master section.
    SelectAssign,
}

impl SmallDisplayTarget {
    /// Wire slot ID, 0-7 for strips and 8 for select-assign.
    #[inline]
    pub fn id(self) -> u8 {
        match self {
            SmallDisplayTarget::Strip(channel) => channel & 0x07,
            SmallDisplayTarget::SelectAssign => 8,
        }
    }

    #[inline]
    pub fn from_id(id: u8) -> Option<SmallDisplayTarget> {
        match id {
            0..=7 => Some(SmallDisplayTarget::Strip(id)),
            8 => Some(SmallDisplayTarget::SelectAssign),
            _ => None,
        }
    }
}

/// A 4-character small display update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmallDisplay {
    target: SmallDisplayTarget,
    text: [u8; SMALL_DISPLAY_LEN],
}

impl SmallDisplay {
    pub fn new(target: SmallDisplayTarget, text: &str) -> Self {
        let mut buf = [BLANK; SMALL_DISPLAY_LEN];
        encode_into(&mut buf, text);
        Self { target, text: buf }
    }

    #[inline]
    pub fn target(&self) -> SmallDisplayTarget {
        self.target
    }

    pub fn text(&self) -> String {
        decode_to_string(&self.text)
    }

    pub(crate) fn from_payload(target: SmallDisplayTarget, payload: &[u8]) -> Self {
        let mut buf = [BLANK; SMALL_DISPLAY_LEN];
        for (slot, &b) in buf.iter_mut().zip(payload) {
            *slot = b & 0x7F;
        }
        Self { target, text: buf }
    }

    pub(crate) fn payload(&self) -> [u8; SMALL_DISPLAY_LEN] {
        self.text
    }
}
