//! Raw joystick events and their human readable labels
//!
//! The kernel joystick interface reports every change as an 8 byte record:
//!
//! ```text
//! u32 time (ms) | i16 value | u8 type | u8 number
//! ```
//!
//! [`RawEvent`] is the decoded form of that record, [`decode`] turns a
//! (kind, index, value) triple into the label shown by the event log.

use std::fmt;

/// Event type byte for button changes
pub const JS_EVENT_BUTTON: u8 = 0x01;
/// Event type byte for axis changes
pub const JS_EVENT_AXIS: u8 = 0x02;
/// Flag set on synthetic events describing the initial device state
pub const JS_EVENT_INIT: u8 = 0x80;

/// Size of one `js_event` record in bytes
pub const EVENT_SIZE: usize = 8;

/// Lowest raw axis value used by the scaling formulas
pub const AXIS_MIN: i32 = -32767;
/// Width of the raw axis range used by the scaling formulas
pub const AXIS_SPAN: i32 = 65534;

/// Kind of change reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Axis,
    Button,
    /// Any other type byte, with the init flag already masked off
    Unknown(u8),
}

impl EventKind {
    fn from_type_byte(byte: u8) -> Self {
        match byte & !JS_EVENT_INIT {
            JS_EVENT_AXIS => EventKind::Axis,
            JS_EVENT_BUTTON => EventKind::Button,
            other => EventKind::Unknown(other),
        }
    }
}

/// Semantic role of the first eight axes of an Xbox 360 style pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    LeftThumbX,
    LeftThumbY,
    LeftTrigger,
    RightThumbX,
    RightThumbY,
    RightTrigger,
    DPadX,
    DPadY,
}

impl AxisRole {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(AxisRole::LeftThumbX),
            1 => Some(AxisRole::LeftThumbY),
            2 => Some(AxisRole::LeftTrigger),
            3 => Some(AxisRole::RightThumbX),
            4 => Some(AxisRole::RightThumbY),
            5 => Some(AxisRole::RightTrigger),
            6 => Some(AxisRole::DPadX),
            7 => Some(AxisRole::DPadY),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AxisRole::LeftThumbX => "Left thumb X",
            AxisRole::LeftThumbY => "Left thumb Y",
            AxisRole::LeftTrigger => "Left trigger",
            AxisRole::RightThumbX => "Right thumb X",
            AxisRole::RightThumbY => "Right thumb Y",
            AxisRole::RightTrigger => "Right trigger",
            AxisRole::DPadX => "D-pad X",
            AxisRole::DPadY => "D-pad Y",
        }
    }
}

/// One change reported by the device event source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub index: u8,
    pub value: i16,
    /// Kernel timestamp in milliseconds
    pub timestamp: u32,
    /// Synthetic event describing the state at open time
    pub init: bool,
}

impl RawEvent {
    pub fn axis(index: u8, value: i16, timestamp: u32) -> Self {
        Self {
            kind: EventKind::Axis,
            index,
            value,
            timestamp,
            init: false,
        }
    }

    pub fn button(index: u8, value: i16, timestamp: u32) -> Self {
        Self {
            kind: EventKind::Button,
            index,
            value,
            timestamp,
            init: false,
        }
    }

    /// Decode a native endian `js_event` record
    pub fn from_bytes(buffer: &[u8; EVENT_SIZE]) -> Self {
        let timestamp = u32::from_ne_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        let value = i16::from_ne_bytes([buffer[4], buffer[5]]);
        let type_byte = buffer[6];

        Self {
            kind: EventKind::from_type_byte(type_byte),
            index: buffer[7],
            value,
            timestamp,
            init: type_byte & JS_EVENT_INIT != 0,
        }
    }

    pub fn is_press(&self) -> bool {
        self.kind == EventKind::Button && self.value != 0
    }

    pub fn label(&self) -> String {
        decode(self.kind, self.index, self.value)
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Map a (kind, index, value) triple to its label. Total over all inputs.
pub fn decode(kind: EventKind, index: u8, value: i16) -> String {
    match kind {
        EventKind::Axis => match AxisRole::from_index(index) {
            Some(role) => format!("{}: {}", role.label(), value),
            None => format!("Axis {}: {}", index, value),
        },
        EventKind::Button => {
            let state = if value == 0 { "RELEASE" } else { "PRESS" };
            format!("Button {} {}", index, state)
        }
        EventKind::Unknown(_) => format!("Unknown {}: {}", index, value),
    }
}
