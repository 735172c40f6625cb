//! HID protocol definitions for the Source Audio C4 Synth
//!
//! Protocol as observed on the pedal's vendor HID interface:
//! - `0x36 hi mid 0xA0` dumps the memory block at that address
//! - `0x77 n` switches to internal preset `n` (0-127)
//! - Read responses are 38 bytes: byte 0 echoes the command, bytes 1-32 hold
//!   the preset name, byte 1 is `0xFF` when the slot is empty

use crate::core::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// USB Vendor ID of the C4 Synth
pub const VENDOR_ID: u16 = 0x29a4;

/// USB Product ID of the C4 Synth
pub const PRODUCT_ID: u16 = 0x0302;

/// Base address of the preset bank in pedal memory
pub const BASE_PRESET_ADDRESS: u32 = 0x80000;

/// Each preset fills 4 KB
pub const PRESET_SIZE: u32 = 0x1000;

/// Offset of the name inside a preset block
pub const PRESET_NAME_OFFSET: u8 = 0xA0;

/// Number of internal preset slots
pub const PRESET_COUNT: usize = 128;

/// Length of the name window in a read response
pub const PRESET_NAME_LEN: usize = 32;

/// Size of a read response block
pub const RESPONSE_SIZE: usize = 38;

/// Minimum response length needed to decode a name (echo byte + name window)
pub const MIN_NAME_RESPONSE: usize = 1 + PRESET_NAME_LEN;

/// First name byte of an unprogrammed slot
pub const EMPTY_SLOT_MARKER: u8 = 0xFF;

/// Commands understood by the pedal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HidCommand {
    /// Dump memory at a 3-byte address
    ReadMemory = 0x36,
    /// Switch to an internal preset
    ProgramChange = 0x77,
}

impl HidCommand {
    /// Convert command to byte value
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Parse command from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x36 => Some(HidCommand::ReadMemory),
            0x77 => Some(HidCommand::ProgramChange),
            _ => None,
        }
    }
}

/// Internal preset slot number, always in 0..=127.
///
/// Neuro Desktop numbers presets 1-128; use [`PresetIndex::from_display_number`]
/// and [`PresetIndex::display_number`] at the user boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PresetIndex(u8);

impl PresetIndex {
    pub fn new(index: u8) -> Result<Self, ProtocolError> {
        if (index as usize) < PRESET_COUNT {
            Ok(Self(index))
        } else {
            Err(ProtocolError::InvalidIndex(index as u32))
        }
    }

    /// Convert a Neuro Desktop preset number (1-128)
    pub fn from_display_number(number: u32) -> Result<Self, ProtocolError> {
        if number == 0 || number as usize > PRESET_COUNT {
            return Err(ProtocolError::InvalidIndex(number));
        }
        Ok(Self((number - 1) as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Neuro Desktop preset number (1-128)
    pub fn display_number(self) -> u16 {
        self.0 as u16 + 1
    }

    /// All slots in scan order
    pub fn all() -> impl Iterator<Item = PresetIndex> {
        (0..PRESET_COUNT as u8).map(PresetIndex)
    }
}

impl TryFrom<u8> for PresetIndex {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PresetIndex> for u8 {
    fn from(index: PresetIndex) -> Self {
        index.0
    }
}

impl fmt::Display for PresetIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Preset name decoded from the 32-byte name window.
///
/// Each byte maps to exactly one `char` (no multi-byte decoding). Trailing
/// `0x00`, space and `0xFF` fill bytes are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetName(String);

impl PresetName {
    pub fn from_bytes(window: &[u8]) -> Self {
        let end = window
            .iter()
            .rposition(|&b| !is_fill_byte(b))
            .map_or(0, |pos| pos + 1);
        Self(window[..end].iter().map(|&b| b as char).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `width` characters, as shown on a 20-column front panel
    pub fn short(&self, width: usize) -> String {
        self.0.chars().take(width).collect()
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_fill_byte(b: u8) -> bool {
    matches!(b, 0x00 | b' ' | EMPTY_SLOT_MARKER)
}

/// Decode a read response into a preset name.
///
/// Returns `Ok(None)` for an empty slot.
pub fn decode_name_response(raw: &[u8]) -> Result<Option<PresetName>, ProtocolError> {
    if raw.len() < MIN_NAME_RESPONSE {
        return Err(ProtocolError::MalformedResponse {
            expected: MIN_NAME_RESPONSE,
            actual: raw.len(),
        });
    }

    if raw[1] == EMPTY_SLOT_MARKER {
        return Ok(None);
    }

    Ok(Some(PresetName::from_bytes(&raw[1..MIN_NAME_RESPONSE])))
}

/// Whether byte 0 of a response echoes the read command
pub fn response_echo_matches(raw: &[u8]) -> bool {
    raw.first() == Some(&HidCommand::ReadMemory.as_byte())
}
