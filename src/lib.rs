//! C4 Synth HID Preset Browser
//!
//! Reads preset names from a Source Audio C4 Synth pedal over its vendor HID
//! interface and switches presets with program changes.
//!
//! # Features
//! - Builds the pedal's memory-read and program-change frames
//! - Decodes 38-byte name dumps, skipping empty slots
//! - Scans all 128 slots with configurable request/response pacing
//! - Converts between internal slots (0-127) and Neuro Desktop numbers (1-128)

pub mod core;
pub mod hid;

pub use core::config::Config;
pub use core::error::{PedalError, ProtocolError, TransportError};
pub use core::presets::{PresetList, PresetRecord};
pub use core::session::PresetSession;
