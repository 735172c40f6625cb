//! Simulated C4 Synth for running without hardware

use super::device::HidTransport;
use super::protocol::{
    HidCommand, BASE_PRESET_ADDRESS, EMPTY_SLOT_MARKER, PRESET_COUNT, PRESET_NAME_LEN,
    PRESET_SIZE, RESPONSE_SIZE,
};
use crate::core::error::TransportError;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// In-memory pedal answering name reads from a 128-slot table
#[derive(Debug, Clone)]
pub struct MockPedal {
    slots: Vec<Option<String>>,
    silent: HashSet<u8>,
    pending: VecDeque<Vec<u8>>,
    program_changes: Vec<u8>,
    fail_writes: bool,
    fail_reads: bool,
}

impl Default for MockPedal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPedal {
    /// Pedal with every slot empty
    pub fn new() -> Self {
        Self {
            slots: vec![None; PRESET_COUNT],
            silent: HashSet::new(),
            pending: VecDeque::new(),
            program_changes: Vec::new(),
            fail_writes: false,
            fail_reads: false,
        }
    }

    /// Pedal with a handful of factory-style presets
    pub fn with_demo_presets() -> Self {
        let mut pedal = Self::new();
        for (index, name) in [
            (0, "Saw Lead"),
            (1, "Square Bass"),
            (4, "Poly Pad"),
            (17, "Arp Sequence"),
            (63, "Envelope Filter"),
            (127, "Octave Fuzz Synth Lead Deluxe 32"),
        ] {
            pedal.set_preset(index, name);
        }
        pedal
    }

    pub fn set_preset(&mut self, index: u8, name: &str) {
        self.slots[index as usize] = Some(name.to_string());
    }

    pub fn clear_preset(&mut self, index: u8) {
        self.slots[index as usize] = None;
    }

    /// Never answer reads for this slot
    pub fn set_silent(&mut self, index: u8) {
        self.silent.insert(index);
    }

    /// Queue an unsolicited report, as if a previous answer arrived late
    pub fn push_report(&mut self, report: Vec<u8>) {
        self.pending.push_back(report);
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Program changes received so far
    pub fn program_changes(&self) -> &[u8] {
        &self.program_changes
    }

    fn name_block(&self, index: u8) -> Vec<u8> {
        let mut block = vec![0u8; RESPONSE_SIZE];
        block[0] = HidCommand::ReadMemory.as_byte();
        match &self.slots[index as usize] {
            Some(name) => {
                let len = name.len().min(PRESET_NAME_LEN);
                block[1..1 + len].copy_from_slice(&name.as_bytes()[..len]);
            }
            None => block[1..1 + PRESET_NAME_LEN].fill(EMPTY_SLOT_MARKER),
        }
        block
    }
}

impl HidTransport for MockPedal {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if self.fail_writes {
            return Err(TransportError::write("mock pedal unplugged"));
        }

        match data.first().copied().and_then(HidCommand::from_byte) {
            Some(HidCommand::ReadMemory) if data.len() >= 4 => {
                let addr = ((data[1] as u32) << 16) | ((data[2] as u32) << 8);
                let slot = addr
                    .checked_sub(BASE_PRESET_ADDRESS)
                    .map(|offset| offset / PRESET_SIZE)
                    .filter(|&slot| (slot as usize) < PRESET_COUNT);
                match slot {
                    Some(slot) if !self.silent.contains(&(slot as u8)) => {
                        let block = self.name_block(slot as u8);
                        self.pending.push_back(block);
                    }
                    _ => debug!("Mock pedal ignoring read at 0x{:06X}", addr),
                }
            }
            Some(HidCommand::ProgramChange) if data.len() >= 2 => {
                self.program_changes.push(data[1]);
            }
            _ => debug!("Mock pedal ignoring frame {:02X?}", data),
        }

        Ok(data.len())
    }

    fn read_timeout(&mut self, buf: &mut [u8], _timeout_ms: i32) -> Result<usize, TransportError> {
        if self.fail_reads {
            return Err(TransportError::read("mock pedal unplugged"));
        }
        match self.pending.pop_front() {
            Some(report) => {
                let len = report.len().min(buf.len());
                buf[..len].copy_from_slice(&report[..len]);
                Ok(len)
            }
            None => Ok(0),
        }
    }
}
