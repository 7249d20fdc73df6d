//! Mirrored surface state.
//!
//! The engine emits one event per wire message; this model is the consumer
//! that folds those events into a complete picture of the control surface:
//! switch/LED states, fader positions, v-pot values, meters, and the three
//! display classes. Large-display slices accumulate here by index,
//! overwriting on repeat, because a host typically retransmits only the
//! slices that changed.

use std::collections::HashMap;

use hui_protocol::{
    decode_byte, LargeDisplaySlice, MeterSide, ProtocolEvent, SmallDisplayTarget, Switch,
    TimeDisplay, LARGE_SLICE_LEN, SMALL_DISPLAY_LEN, STRIP_COUNT,
};

/// Rows of the large display.
pub const LARGE_DISPLAY_ROWS: usize = 2;
/// Columns per large-display row.
pub const LARGE_DISPLAY_COLS: usize = 40;

/// The 2x40 large display, assembled from slices.
///
/// Slices 0-3 form the top row, 4-7 the bottom row.
#[derive(Clone, Debug)]
pub struct LargeDisplayModel {
    rows: [[u8; LARGE_DISPLAY_COLS]; LARGE_DISPLAY_ROWS],
}

impl Default for LargeDisplayModel {
    fn default() -> Self {
        Self {
            rows: [[b' '; LARGE_DISPLAY_COLS]; LARGE_DISPLAY_ROWS],
        }
    }
}

impl LargeDisplayModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one slice, overwriting whatever that index held before.
    pub fn apply_slice(&mut self, slice: &LargeDisplaySlice) {
        let index = slice.index() as usize;
        let row = index / (LARGE_DISPLAY_COLS / LARGE_SLICE_LEN);
        let col = (index % (LARGE_DISPLAY_COLS / LARGE_SLICE_LEN)) * LARGE_SLICE_LEN;
        let text = slice.text();
        for (offset, c) in text.bytes().enumerate() {
            self.rows[row][col + offset] = c;
        }
    }

    /// One row of the display as text.
    pub fn row(&self, row: usize) -> String {
        self.rows[row.min(LARGE_DISPLAY_ROWS - 1)]
            .iter()
            .map(|&b| decode_byte(b))
            .collect()
    }
}

/// Complete mirrored state for one peer's view of the surface.
#[derive(Clone, Debug, Default)]
pub struct SurfaceState {
    switches: HashMap<Switch, bool>,
    faders: [u16; STRIP_COUNT],
    fader_touched: [bool; STRIP_COUNT],
    /// Raw 7-bit values per v-pot, master wheel last.
    vpots: [u8; STRIP_COUNT + 1],
    /// Meter levels indexed by channel, then [left, right].
    meters: [[u8; 2]; STRIP_COUNT],
    small_displays: [[u8; SMALL_DISPLAY_LEN]; STRIP_COUNT + 1],
    time_display: TimeDisplay,
    large_display: LargeDisplayModel,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self {
            small_displays: [[b' '; SMALL_DISPLAY_LEN]; STRIP_COUNT + 1],
            ..Self::default()
        }
    }

    /// Fold one decoded event into the model.
    pub fn apply(&mut self, event: &ProtocolEvent) {
        match event {
            ProtocolEvent::SwitchChanged { switch, on } => {
                self.switches.insert(*switch, *on);
            }
            ProtocolEvent::FaderLevel { channel, level } => {
                self.faders[*channel as usize % STRIP_COUNT] = *level;
            }
            ProtocolEvent::FaderTouch { channel, touched } => {
                self.fader_touched[*channel as usize % STRIP_COUNT] = *touched;
            }
            ProtocolEvent::VPotValue { vpot, value } => {
                self.vpots[vpot.index() as usize] = *value;
            }
            ProtocolEvent::MeterLevel {
                channel,
                side,
                level,
            } => {
                self.meters[*channel as usize % STRIP_COUNT][side.bit_index()] = *level;
            }
            ProtocolEvent::LargeDisplayUpdated(slice) => {
                self.large_display.apply_slice(slice);
            }
            ProtocolEvent::TimeDisplayUpdated(display) => {
                self.time_display = *display;
            }
            ProtocolEvent::SmallDisplayUpdated(display) => {
                let slot = display.target().id() as usize;
                let text = display.text();
                for (slot_byte, b) in self.small_displays[slot].iter_mut().zip(text.bytes()) {
                    *slot_byte = b;
                }
            }
            // Liveness is the ping monitor's concern, not the model's.
            ProtocolEvent::Ping { .. } => {}
        }
    }

    /// Switch state; switches never reported default to off.
    pub fn switch(&self, switch: Switch) -> bool {
        self.switches.get(&switch).copied().unwrap_or(false)
    }

    pub fn fader(&self, channel: u8) -> u16 {
        self.faders[channel as usize % STRIP_COUNT]
    }

    pub fn fader_touched(&self, channel: u8) -> bool {
        self.fader_touched[channel as usize % STRIP_COUNT]
    }

    pub fn vpot(&self, index: u8) -> u8 {
        self.vpots[index as usize % (STRIP_COUNT + 1)]
    }

    pub fn meter(&self, channel: u8, side: MeterSide) -> u8 {
        self.meters[channel as usize % STRIP_COUNT][side.bit_index()]
    }

    pub fn small_display(&self, target: SmallDisplayTarget) -> String {
        self.small_displays[target.id() as usize]
            .iter()
            .map(|&b| decode_byte(b))
            .collect()
    }

    pub fn time_display(&self) -> &TimeDisplay {
        &self.time_display
    }

    pub fn large_display_row(&self, row: usize) -> String {
        self.large_display.row(row)
    }
}

/// Side to meter-array index, kept here so the model stays array-backed.
trait SideIndex {
    fn bit_index(&self) -> usize;
}

impl SideIndex for MeterSide {
    fn bit_index(&self) -> usize {
        match self {
            MeterSide::Left => 0,
            MeterSide::Right => 1,
        }
    }
}
