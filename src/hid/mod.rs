//! HID module - USB HID communication with the C4 Synth pedal

pub mod commands;
pub mod device;
#[cfg(any(test, feature = "mock-hid"))]
pub mod mock;
pub mod protocol;

pub use commands::{build_address_triplet, build_program_change, build_read_request};
pub use device::{open_device, HidTransport};
pub use protocol::{decode_name_response, HidCommand, PresetIndex, PresetName};
