//! The wire message type exchanged with the transport.
//!
//! Everything the protocol says travels as one of three MIDI shapes on
//! channel 1: a Control Change, a Polyphonic Pressure, or a System-Exclusive
//! message under the fixed manufacturer header. Channel-voice serialization
//! goes through the generic `midi-msg` codec; SysEx bodies are assembled
//! literally around the header constants.

use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg};

use crate::error::{Error, Result};

/// Manufacturer ID carried by every protocol SysEx message.
pub const MANUFACTURER_ID: [u8; 3] = [0x00, 0x00, 0x66];
/// Sub-ID bytes following the manufacturer ID.
pub const SYSEX_SUB_ID: [u8; 2] = [0x05, 0x00];

/// SysEx body type: small display update.
pub(crate) const DISPLAY_SMALL: u8 = 0x10;
/// SysEx body type: time display update.
pub(crate) const DISPLAY_TIME: u8 = 0x11;
/// SysEx body type: large display slice.
pub(crate) const DISPLAY_LARGE: u8 = 0x12;
/// SysEx body type: host liveness ping.
pub(crate) const PING_HOST: u8 = 0x00;
/// SysEx body type: surface liveness ping.
pub(crate) const PING_SURFACE: u8 = 0x01;

/// A single MIDI message carrying protocol data.
///
/// `SystemExclusive` holds the full body between the `F0`/`F7` framing
/// bytes, including the manufacturer header, so foreign SysEx traffic is
/// representable and can be ignored by the decoder rather than the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HuiMessage {
    ControlChange { controller: u8, value: u8 },
    PolyPressure { note: u8, pressure: u8 },
    SystemExclusive { data: Vec<u8> },
}

impl HuiMessage {
    #[inline]
    pub fn control_change(controller: u8, value: u8) -> Self {
        Self::ControlChange {
            controller: controller & 0x7F,
            value: value & 0x7F,
        }
    }

    #[inline]
    pub fn poly_pressure(note: u8, pressure: u8) -> Self {
        Self::PolyPressure {
            note: note & 0x7F,
            pressure: pressure & 0x7F,
        }
    }

    /// A SysEx message under the protocol's manufacturer header.
    pub(crate) fn protocol_sysex(body: &[u8]) -> Self {
        let mut data =
            Vec::with_capacity(MANUFACTURER_ID.len() + SYSEX_SUB_ID.len() + body.len());
        data.extend_from_slice(&MANUFACTURER_ID);
        data.extend_from_slice(&SYSEX_SUB_ID);
        data.extend_from_slice(body);
        Self::SystemExclusive { data }
    }

    /// The body after the manufacturer header, or `None` for anything that
    /// is not a protocol SysEx message.
    pub(crate) fn protocol_body(&self) -> Option<&[u8]> {
        match self {
            Self::SystemExclusive { data } => {
                let header_len = MANUFACTURER_ID.len() + SYSEX_SUB_ID.len();
                if data.len() >= header_len
                    && data[..MANUFACTURER_ID.len()] == MANUFACTURER_ID
                    && data[MANUFACTURER_ID.len()..header_len] == SYSEX_SUB_ID
                {
                    Some(&data[header_len..])
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Serialize to raw MIDI bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::ControlChange { controller, value } => MidiMsg::ChannelVoice {
                channel: Channel::from_u8(0),
                msg: ChannelVoiceMsg::ControlChange {
                    control: ControlChange::CC {
                        control: *controller,
                        value: *value,
                    },
                },
            }
            .to_midi(),
            Self::PolyPressure { note, pressure } => MidiMsg::ChannelVoice {
                channel: Channel::from_u8(0),
                msg: ChannelVoiceMsg::PolyPressure {
                    note: *note,
                    pressure: *pressure,
                },
            }
            .to_midi(),
            Self::SystemExclusive { data } => {
                let mut bytes = Vec::with_capacity(data.len() + 2);
                bytes.push(0xF0);
                bytes.extend_from_slice(data);
                bytes.push(0xF7);
                bytes
            }
        }
    }

    /// Classify raw MIDI bytes.
    ///
    /// Classification matches status bytes directly: this protocol is
    /// addressed by raw controller number, so the semantic CC layer of a
    /// general-purpose parser is the wrong shape here. Statuses the protocol
    /// never uses are rejected, which callers treat as "not ours".
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&status, data) = bytes.split_first().ok_or(Error::Truncated(0))?;
        match status {
            0xB0 => match data {
                [controller, value] => Ok(Self::control_change(*controller, *value)),
                _ => Err(Error::Truncated(bytes.len())),
            },
            0xA0 => match data {
                [note, pressure] => Ok(Self::poly_pressure(*note, *pressure)),
                _ => Err(Error::Truncated(bytes.len())),
            },
            0xF0 => match data.split_last() {
                Some((&0xF7, body)) => Ok(Self::SystemExclusive {
                    data: body.to_vec(),
                }),
                _ => Err(Error::UnterminatedSysEx),
            },
            other => Err(Error::UnsupportedStatus(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_change_bytes() {
        let msg = HuiMessage::control_change(0x0C, 0x05);
        assert_eq!(msg.to_bytes(), vec![0xB0, 0x0C, 0x05]);
    }

    #[test]
    fn test_poly_pressure_bytes() {
        let msg = HuiMessage::poly_pressure(2, 0x1C);
        assert_eq!(msg.to_bytes(), vec![0xA0, 2, 0x1C]);
    }

    #[test]
    fn test_data_bytes_masked() {
        let msg = HuiMessage::control_change(0xFF, 0xFF);
        assert_eq!(msg.to_bytes(), vec![0xB0, 0x7F, 0x7F]);
    }

    #[test]
    fn test_sysex_framing() {
        let msg = HuiMessage::protocol_sysex(&[DISPLAY_TIME, 0x01]);
        assert_eq!(
            msg.to_bytes(),
            vec![0xF0, 0x00, 0x00, 0x66, 0x05, 0x00, 0x11, 0x01, 0xF7]
        );
    }

    #[test]
    fn test_bytes_round_trip() {
        let messages = [
            HuiMessage::control_change(0x2C, 0x42),
            HuiMessage::poly_pressure(5, 0x0C),
            HuiMessage::protocol_sysex(&[PING_HOST]),
        ];
        for msg in &messages {
            assert_eq!(&HuiMessage::from_bytes(&msg.to_bytes()).unwrap(), msg);
        }
    }

    #[test]
    fn test_protocol_body_screens_foreign_sysex() {
        let ours = HuiMessage::protocol_sysex(&[DISPLAY_SMALL, 3]);
        assert_eq!(ours.protocol_body(), Some(&[DISPLAY_SMALL, 3][..]));

        let foreign = HuiMessage::SystemExclusive {
            data: vec![0x7E, 0x00, 0x06, 0x01],
        };
        assert_eq!(foreign.protocol_body(), None);
    }

    #[test]
    fn test_from_bytes_rejects_unrelated_statuses() {
        assert!(matches!(
            HuiMessage::from_bytes(&[0x90, 60, 100]),
            Err(Error::UnsupportedStatus(0x90))
        ));
        assert!(matches!(
            HuiMessage::from_bytes(&[0xB0, 0x0C]),
            Err(Error::Truncated(2))
        ));
        assert!(matches!(
            HuiMessage::from_bytes(&[0xF0, 0x00]),
            Err(Error::UnterminatedSysEx)
        ));
        assert!(matches!(HuiMessage::from_bytes(&[]), Err(Error::Truncated(0))));
    }
}
