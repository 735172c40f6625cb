//! HID command builders
//!
//! Pure helpers turning preset indices into request frames.

use super::protocol::{
    HidCommand, PresetIndex, BASE_PRESET_ADDRESS, PRESET_NAME_OFFSET, PRESET_SIZE,
};
use crate::core::error::ProtocolError;

/// Memory address of the preset block for `index`
pub fn preset_address(index: PresetIndex) -> u32 {
    BASE_PRESET_ADDRESS + index.value() as u32 * PRESET_SIZE
}

/// Address bytes `(hi, mid, name offset)` for reading the name of preset `index`
pub fn build_address_triplet(index: u8) -> Result<(u8, u8, u8), ProtocolError> {
    let addr = preset_address(PresetIndex::new(index)?);
    Ok(((addr >> 16) as u8, ((addr >> 8) & 0xFF) as u8, PRESET_NAME_OFFSET))
}

/// Build a memory read request for the name of preset `index`
pub fn build_read_request(index: u8) -> Result<[u8; 4], ProtocolError> {
    let (hi, mid, lo) = build_address_triplet(index)?;
    Ok([HidCommand::ReadMemory.as_byte(), hi, mid, lo])
}

/// Build a program change to preset `index`
pub fn build_program_change(index: u8) -> Result<[u8; 2], ProtocolError> {
    let index = PresetIndex::new(index)?;
    Ok([HidCommand::ProgramChange.as_byte(), index.value()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triplet_reconstructs_address() {
        for index in 0..128u8 {
            let (hi, mid, lo) = build_address_triplet(index).unwrap();
            assert_eq!(lo, 0xA0);
            let addr = ((hi as u32) << 16) | ((mid as u32) << 8);
            assert_eq!(addr, BASE_PRESET_ADDRESS + index as u32 * PRESET_SIZE);
        }
    }

    #[test]
    fn test_read_request_first_preset() {
        assert_eq!(build_read_request(0).unwrap(), [0x36, 0x08, 0x00, 0xA0]);
    }

    #[test]
    fn test_read_request_last_preset() {
        let request = build_read_request(127).unwrap();
        assert_eq!(request[0], 0x36);
        let addr = ((request[1] as u32) << 16) | ((request[2] as u32) << 8);
        assert_eq!(addr, 0x80000 + 127 * 0x1000);
        assert_eq!(request[3], 0xA0);
    }

    #[test]
    fn test_read_request_invalid_index() {
        assert_eq!(build_read_request(128), Err(ProtocolError::InvalidIndex(128)));
        assert!(build_address_triplet(255).is_err());
    }

    #[test]
    fn test_build_program_change() {
        assert_eq!(build_program_change(5).unwrap(), [0x77, 5]);
        assert_eq!(build_program_change(0).unwrap(), [0x77, 0]);
        assert_eq!(build_program_change(127).unwrap(), [0x77, 127]);
        assert_eq!(
            build_program_change(128),
            Err(ProtocolError::InvalidIndex(128))
        );
    }
}
